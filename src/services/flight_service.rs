use crate::models::approval::ApprovalKind;
use crate::models::flight::{
    Flight, FlightCreateRequest, FlightSearchQuery, FlightUpdateRequest, Recurrence,
};
use crate::models::seat_class::{Cabin, SeatClass};
use crate::models::{new_id, EntityStatus};
use crate::services::approval_service;
use crate::services::availability;
use crate::services::seat_class_service::{fetch_seat_class_by_name, SEAT_CLASS_COLUMNS};
use crate::services::user_service::{append_to_provider, fetch_service_provider, ProviderList};
use crate::utils::error::{AppError, AppResult};
use chrono::NaiveTime;
use sqlx::AnyPool;
use sqlx::AnyConnection;
use std::collections::HashMap;
use std::str::FromStr;
use validator::Validate;

pub(crate) const FLIGHT_COLUMNS: &str = "id, airline, flight_number, origin, destination, \
    departure_time, arrival_time, image, duration, seat_class_id, luggage_capacity, status, recurrence";

pub(crate) async fn fetch_flight(conn: &mut AnyConnection, flight_id: &str) -> AppResult<Option<Flight>> {
    let flight = sqlx::query_as::<_, Flight>(&format!(
        "SELECT {} FROM flights WHERE id = ?",
        FLIGHT_COLUMNS
    ))
    .bind(flight_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(flight)
}

// 24-hour HH:mm
fn check_clock_time(field: &str, value: &str) -> AppResult<()> {
    let well_formed = value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok();
    if !well_formed {
        return Err(AppError::ValidationError(format!(
            "{} must be a 24-hour HH:mm time, got '{}'",
            field, value
        )));
    }
    Ok(())
}

fn check_recurrence(value: &str) -> AppResult<()> {
    Recurrence::from_str(value)
        .map(|_| ())
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

#[derive(Clone)]
pub struct FlightService {
    pool: AnyPool,
}

impl FlightService {
    pub fn new(pool: AnyPool) -> Self {
        FlightService { pool }
    }

    pub async fn list_flights(&self) -> AppResult<Vec<Flight>> {
        let flights = sqlx::query_as::<_, Flight>(&format!(
            "SELECT {} FROM flights ORDER BY flight_number",
            FLIGHT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        if flights.is_empty() {
            return Err(AppError::NotFound("No flights found.".into()));
        }
        Ok(flights)
    }

    pub async fn get_flight(&self, flight_id: &str) -> AppResult<Flight> {
        let mut conn = self.pool.acquire().await?;
        fetch_flight(&mut conn, flight_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Flight not found.".into()))
    }

    /// Creates a flight awaiting approval. Its seat class is the one named
    /// after the flight number; the airline is the provider's name.
    pub async fn create_flight(&self, request: FlightCreateRequest) -> AppResult<Flight> {
        request.validate()?;
        check_clock_time("departureTime", &request.departure_time)?;
        check_clock_time("arrivalTime", &request.arrival_time)?;
        check_recurrence(&request.recurrence)?;

        let mut tx = self.pool.begin().await?;

        let duplicate = sqlx::query("SELECT id FROM flights WHERE flight_number = ?")
            .bind(&request.flight_number)
            .fetch_optional(&mut *tx)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(
                "Flight number already exists. Please use a unique flight number.".into(),
            ));
        }

        let seat_class = fetch_seat_class_by_name(&mut tx, &request.flight_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Seat class not found for the provided flight number.".into())
            })?;

        let provider = fetch_service_provider(&mut tx, &request.service_provider_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service provider not found.".into()))?;

        let flight = Flight {
            id: new_id(),
            airline: provider.name.clone(),
            flight_number: request.flight_number,
            origin: request.origin,
            destination: request.destination,
            departure_time: request.departure_time,
            arrival_time: request.arrival_time,
            image: Some(request.image),
            duration: request.duration,
            seat_class_id: seat_class.id,
            luggage_capacity: request.luggage_capacity,
            status: EntityStatus::AwaitingApproval,
            recurrence: request.recurrence,
        };

        sqlx::query(&format!(
            "INSERT INTO flights ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            FLIGHT_COLUMNS
        ))
        .bind(&flight.id)
        .bind(&flight.airline)
        .bind(&flight.flight_number)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(&flight.departure_time)
        .bind(&flight.arrival_time)
        .bind(&flight.image)
        .bind(&flight.duration)
        .bind(&flight.seat_class_id)
        .bind(&flight.luggage_capacity)
        .bind(flight.status.to_string())
        .bind(&flight.recurrence)
        .execute(&mut *tx)
        .await?;

        append_to_provider(&mut tx, &provider, ProviderList::Flights, &flight.id).await?;
        approval_service::open_request(&mut tx, &provider.id, ApprovalKind::Flight, &flight.id).await?;

        tx.commit().await?;
        tracing::info!(flight_id = %flight.id, flight_number = %flight.flight_number, "flight created");
        Ok(flight)
    }

    pub async fn update_flight(&self, flight_id: &str, update: FlightUpdateRequest) -> AppResult<Flight> {
        let mut tx = self.pool.begin().await?;

        let mut flight = fetch_flight(&mut tx, flight_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Flight not found.".into()))?;

        if let Some(flight_number) = update.flight_number.filter(|n| !n.is_empty()) {
            if flight_number != flight.flight_number {
                let seat_class = fetch_seat_class_by_name(&mut tx, &flight_number)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(
                            "Seat model not found for the provided flight number.".into(),
                        )
                    })?;
                flight.seat_class_id = seat_class.id;
                flight.flight_number = flight_number;
            }
        }
        if let Some(airline) = update.airline {
            flight.airline = airline;
        }
        if let Some(origin) = update.origin {
            flight.origin = origin;
        }
        if let Some(destination) = update.destination {
            flight.destination = destination;
        }
        if let Some(departure_time) = update.departure_time {
            check_clock_time("departureTime", &departure_time)?;
            flight.departure_time = departure_time;
        }
        if let Some(arrival_time) = update.arrival_time {
            check_clock_time("arrivalTime", &arrival_time)?;
            flight.arrival_time = arrival_time;
        }
        if update.duration.is_some() {
            flight.duration = update.duration;
        }
        if update.luggage_capacity.is_some() {
            flight.luggage_capacity = update.luggage_capacity;
        }
        if let Some(recurrence) = update.recurrence {
            check_recurrence(&recurrence)?;
            flight.recurrence = recurrence;
        }
        flight.status = EntityStatus::AwaitingApproval;

        sqlx::query(
            r#"UPDATE flights SET airline = ?, flight_number = ?, origin = ?, destination = ?,
                departure_time = ?, arrival_time = ?, duration = ?, seat_class_id = ?,
                luggage_capacity = ?, status = ?, recurrence = ?
            WHERE id = ?"#,
        )
        .bind(&flight.airline)
        .bind(&flight.flight_number)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(&flight.departure_time)
        .bind(&flight.arrival_time)
        .bind(&flight.duration)
        .bind(&flight.seat_class_id)
        .bind(&flight.luggage_capacity)
        .bind(flight.status.to_string())
        .bind(&flight.recurrence)
        .bind(&flight.id)
        .execute(&mut *tx)
        .await?;

        // updates carry no requester; the entity id stands in
        approval_service::open_request(&mut tx, &flight.id, ApprovalKind::Flight, &flight.id).await?;

        tx.commit().await?;
        tracing::info!(flight_id, "flight updated, awaiting approval");
        Ok(flight)
    }

    pub async fn delete_flight(&self, flight_id: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let flight = fetch_flight(&mut tx, flight_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Flight not found.".into()))?;

        approval_service::close_for_deleted_entity(&mut tx, flight_id).await?;

        sqlx::query("DELETE FROM flights WHERE id = ?")
            .bind(flight_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        // the image itself belongs to the file storage service
        tracing::info!(flight_id, image = ?flight.image, "flight deleted");
        Ok(())
    }

    /// Flights matching the route, operating on the date and with seats
    /// left in the requested cabin. Every criterion is optional.
    pub async fn search_flights(&self, query: FlightSearchQuery) -> AppResult<Vec<Flight>> {
        let cabin = query
            .seat_class
            .as_deref()
            .map(|raw| {
                Cabin::from_str(raw).map_err(|_| {
                    AppError::ValidationError(
                        "Invalid seat class. Must be one of: Economy, Business, First.".into(),
                    )
                })
            })
            .transpose()?;

        let mut sql = format!("SELECT {} FROM flights WHERE 1 = 1", FLIGHT_COLUMNS);
        let mut filters = Vec::new();
        if let Some(origin) = query.origin {
            sql.push_str(" AND origin = ?");
            filters.push(origin);
        }
        if let Some(destination) = query.destination {
            sql.push_str(" AND destination = ?");
            filters.push(destination);
        }
        sql.push_str(" ORDER BY departure_time");

        let mut statement = sqlx::query_as::<_, Flight>(&sql);
        for value in filters {
            statement = statement.bind(value);
        }
        let mut flights = statement.fetch_all(&self.pool).await?;

        if let Some(date) = query.date {
            flights.retain(|flight| availability::is_available(&flight.recurrence, date));
        }

        if let Some(cabin) = cabin {
            let seat_classes: HashMap<String, SeatClass> = sqlx::query_as::<_, SeatClass>(
                &format!("SELECT {} FROM seat_classes", SEAT_CLASS_COLUMNS),
            )
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|seat_class| (seat_class.id.clone(), seat_class))
            .collect();

            flights.retain(|flight| {
                seat_classes
                    .get(&flight.seat_class_id)
                    .map(|seat_class| seat_class.fare(cabin).available_seats > 0)
                    .unwrap_or(false)
            });
        }

        if flights.is_empty() {
            return Err(AppError::NotFound("No flights found for the given criteria.".into()));
        }
        tracing::debug!(found = flights.len(), "flight search");
        Ok(flights)
    }
}
