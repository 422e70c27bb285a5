use crate::models::new_id;
use crate::models::passenger::{
    MealChoice, Passenger, PassengerCategory, PassengerCreateRequest, PassengerUpdateRequest,
};
use crate::models::seat_class::Cabin;
use crate::utils::error::{AppError, AppResult};
use sqlx::AnyPool;
use sqlx::AnyConnection;
use std::collections::HashSet;
use std::str::FromStr;
use validator::Validate;

const PASSENGER_COLUMNS: &str = "id, name, age, phone, gender, seat_class, food, category";

fn check_cabin(value: &str) -> AppResult<()> {
    Cabin::from_str(value).map(|_| ()).map_err(|_| {
        AppError::ValidationError("Invalid seat class. Must be one of: Economy, Business, First.".into())
    })
}

fn check_meal(value: &str) -> AppResult<()> {
    MealChoice::from_str(value)
        .map(|_| ())
        .map_err(|_| AppError::ValidationError("Please select your choice of food.".into()))
}

fn check_category(value: &str) -> AppResult<()> {
    PassengerCategory::from_str(value).map(|_| ()).map_err(|_| {
        AppError::ValidationError(
            "Please select one: Student, Senior Citizen, Disabled, Army, Doctor, or Normal.".into(),
        )
    })
}

/// Loads whichever of the given passengers still exist, in request order
/// with repeats dropped.
pub(crate) async fn fetch_existing_passengers(
    conn: &mut AnyConnection,
    passenger_ids: &[String],
) -> AppResult<Vec<Passenger>> {
    let mut seen = HashSet::new();
    let wanted: Vec<&str> = passenger_ids
        .iter()
        .map(|id| id.as_str())
        .filter(|id| seen.insert(*id))
        .collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; wanted.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM passengers WHERE id IN ({})",
        PASSENGER_COLUMNS, placeholders
    );
    let mut statement = sqlx::query_as::<_, Passenger>(&sql);
    for id in &wanted {
        statement = statement.bind(*id);
    }
    let mut found = statement.fetch_all(&mut *conn).await?;

    found.sort_by_key(|p| wanted.iter().position(|id| *id == p.id));
    Ok(found)
}

/// Like [`fetch_existing_passengers`], but every id must resolve; the error
/// lists the ones that do not.
pub(crate) async fn fetch_passengers(
    conn: &mut AnyConnection,
    passenger_ids: &[String],
) -> AppResult<Vec<Passenger>> {
    let found = fetch_existing_passengers(conn, passenger_ids).await?;

    let found_ids: HashSet<&str> = found.iter().map(|p| p.id.as_str()).collect();
    let mut reported = HashSet::new();
    let missing: Vec<&str> = passenger_ids
        .iter()
        .map(|id| id.as_str())
        .filter(|id| !found_ids.contains(id) && reported.insert(*id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::NotFound(format!(
            "Passenger IDs not found: {}",
            missing.join(", ")
        )));
    }
    Ok(found)
}

#[derive(Clone)]
pub struct PassengerService {
    pool: AnyPool,
}

impl PassengerService {
    pub fn new(pool: AnyPool) -> Self {
        PassengerService { pool }
    }

    pub async fn list_passengers(&self) -> AppResult<Vec<Passenger>> {
        let passengers = sqlx::query_as::<_, Passenger>(&format!(
            "SELECT {} FROM passengers ORDER BY name",
            PASSENGER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        if passengers.is_empty() {
            return Err(AppError::NotFound("No Passenger to show.".into()));
        }
        Ok(passengers)
    }

    pub async fn get_passenger(&self, passenger_id: &str) -> AppResult<Passenger> {
        sqlx::query_as::<_, Passenger>(&format!(
            "SELECT {} FROM passengers WHERE id = ?",
            PASSENGER_COLUMNS
        ))
        .bind(passenger_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Passenger not found.".into()))
    }

    /// Passengers are disposable: any earlier record with the same name,
    /// age and gender is replaced by the new one.
    pub async fn create_passenger(&self, request: PassengerCreateRequest) -> AppResult<Passenger> {
        request.validate()?;
        check_cabin(&request.seat_class)?;
        check_meal(&request.food)?;
        check_category(&request.category)?;

        let passenger = Passenger {
            id: new_id(),
            name: request.name,
            age: request.age,
            phone: request.phone,
            gender: request.gender,
            seat_class: request.seat_class,
            food: request.food,
            category: request.category,
        };

        let mut tx = self.pool.begin().await?;

        let replaced = sqlx::query("DELETE FROM passengers WHERE name = ? AND age = ? AND gender = ?")
            .bind(&passenger.name)
            .bind(passenger.age)
            .bind(&passenger.gender)
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            "INSERT INTO passengers ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            PASSENGER_COLUMNS
        ))
        .bind(&passenger.id)
        .bind(&passenger.name)
        .bind(passenger.age)
        .bind(&passenger.phone)
        .bind(&passenger.gender)
        .bind(&passenger.seat_class)
        .bind(&passenger.food)
        .bind(&passenger.category)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(passenger_id = %passenger.id, replaced = replaced.rows_affected(), "passenger created");
        Ok(passenger)
    }

    /// Cabin and meal are mandatory on update; the rest only if given.
    pub async fn update_passenger(
        &self,
        passenger_id: &str,
        update: PassengerUpdateRequest,
    ) -> AppResult<Passenger> {
        update.validate()?;
        check_cabin(&update.seat_class)?;
        check_meal(&update.food)?;

        let mut passenger = self.get_passenger(passenger_id).await?;
        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            passenger.name = name;
        }
        if let Some(age) = update.age {
            passenger.age = age;
        }
        if update.phone.is_some() {
            passenger.phone = update.phone;
        }
        passenger.seat_class = update.seat_class;
        passenger.food = update.food;

        sqlx::query(
            "UPDATE passengers SET name = ?, age = ?, phone = ?, seat_class = ?, food = ? WHERE id = ?",
        )
        .bind(&passenger.name)
        .bind(passenger.age)
        .bind(&passenger.phone)
        .bind(&passenger.seat_class)
        .bind(&passenger.food)
        .bind(&passenger.id)
        .execute(&self.pool)
        .await?;

        Ok(passenger)
    }

    pub async fn delete_passenger(&self, passenger_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM passengers WHERE id = ?")
            .bind(passenger_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Passenger not found.".into()));
        }
        Ok(())
    }
}
