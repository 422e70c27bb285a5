use crate::models::approval::ApprovalKind;
use crate::models::seat_class::{SeatClass, SeatClassCreateRequest, SeatClassUpdateRequest};
use crate::models::{new_id, EntityStatus};
use crate::services::approval_service;
use crate::services::user_service::{append_to_provider, fetch_service_provider, ProviderList};
use crate::utils::error::{AppError, AppResult};
use sqlx::AnyPool;
use sqlx::AnyConnection;
use validator::Validate;

pub(crate) const SEAT_CLASS_COLUMNS: &str = "id, seat_class_name, \
    economy_seats, economy_seat_price, economy_food_price, economy_available_seats, \
    business_seats, business_seat_price, business_food_price, business_available_seats, \
    first_class_seats, first_class_seat_price, first_class_food_price, first_class_available_seats, \
    total_seats, total_available_seats, status";

pub(crate) async fn fetch_seat_class(
    conn: &mut AnyConnection,
    seat_class_id: &str,
) -> AppResult<Option<SeatClass>> {
    let seat_class = sqlx::query_as::<_, SeatClass>(&format!(
        "SELECT {} FROM seat_classes WHERE id = ?",
        SEAT_CLASS_COLUMNS
    ))
    .bind(seat_class_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(seat_class)
}

pub(crate) async fn fetch_seat_class_by_name(
    conn: &mut AnyConnection,
    name: &str,
) -> AppResult<Option<SeatClass>> {
    let seat_class = sqlx::query_as::<_, SeatClass>(&format!(
        "SELECT {} FROM seat_classes WHERE seat_class_name = ?",
        SEAT_CLASS_COLUMNS
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(seat_class)
}

#[derive(Clone)]
pub struct SeatClassService {
    pool: AnyPool,
}

impl SeatClassService {
    pub fn new(pool: AnyPool) -> Self {
        SeatClassService { pool }
    }

    pub async fn list_seat_classes(&self) -> AppResult<Vec<SeatClass>> {
        let seat_classes = sqlx::query_as::<_, SeatClass>(&format!(
            "SELECT {} FROM seat_classes ORDER BY seat_class_name",
            SEAT_CLASS_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        if seat_classes.is_empty() {
            return Err(AppError::NotFound("No Seat Classes found.".into()));
        }
        Ok(seat_classes)
    }

    pub async fn get_seat_class(&self, seat_class_id: &str) -> AppResult<SeatClass> {
        let mut conn = self.pool.acquire().await?;
        fetch_seat_class(&mut conn, seat_class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Seat class not found.".into()))
    }

    /// Creates a seat class awaiting approval, links it to its provider and
    /// opens the approval request, all in one transaction.
    pub async fn create_seat_class(&self, request: SeatClassCreateRequest) -> AppResult<SeatClass> {
        request.validate()?;

        let mut seat_class = SeatClass {
            id: new_id(),
            seat_class_name: request.seat_class_name,
            economy_seats: request.economy_seats,
            economy_seat_price: request.economy_seat_price,
            economy_food_price: request.economy_food_price,
            economy_available_seats: request.economy_available_seats,
            business_seats: request.business_seats,
            business_seat_price: request.business_seat_price,
            business_food_price: request.business_food_price,
            business_available_seats: request.business_available_seats,
            first_class_seats: request.first_class_seats,
            first_class_seat_price: request.first_class_seat_price,
            first_class_food_price: request.first_class_food_price,
            first_class_available_seats: request.first_class_available_seats,
            total_seats: 0,
            total_available_seats: 0,
            status: EntityStatus::AwaitingApproval,
        };
        seat_class.recompute_totals().map_err(AppError::ValidationError)?;
        seat_class.validate_figures().map_err(AppError::ValidationError)?;

        let mut tx = self.pool.begin().await?;

        if fetch_seat_class_by_name(&mut tx, &seat_class.seat_class_name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Seat class already exists, please check again.".into(),
            ));
        }

        let provider = fetch_service_provider(&mut tx, &request.service_provider_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service provider not found.".into()))?;

        insert_seat_class(&mut tx, &seat_class).await?;
        append_to_provider(&mut tx, &provider, ProviderList::SeatClasses, &seat_class.id).await?;
        approval_service::open_request(&mut tx, &provider.id, ApprovalKind::SeatClass, &seat_class.id)
            .await?;

        tx.commit().await?;
        tracing::info!(seat_class_id = %seat_class.id, name = %seat_class.seat_class_name, "seat class created");
        Ok(seat_class)
    }

    /// Applies a partial update, recomputes totals, flips the record back to
    /// awaiting approval and replaces any pending request with a new one.
    pub async fn update_seat_class(
        &self,
        seat_class_id: &str,
        update: SeatClassUpdateRequest,
    ) -> AppResult<SeatClass> {
        let mut tx = self.pool.begin().await?;

        let mut seat_class = fetch_seat_class(&mut tx, seat_class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Seat class not found.".into()))?;

        seat_class.apply(update).map_err(AppError::ValidationError)?;
        seat_class.validate_figures().map_err(AppError::ValidationError)?;
        seat_class.status = EntityStatus::AwaitingApproval;

        sqlx::query(
            r#"UPDATE seat_classes SET seat_class_name = ?,
                economy_seats = ?, economy_seat_price = ?, economy_food_price = ?, economy_available_seats = ?,
                business_seats = ?, business_seat_price = ?, business_food_price = ?, business_available_seats = ?,
                first_class_seats = ?, first_class_seat_price = ?, first_class_food_price = ?, first_class_available_seats = ?,
                total_seats = ?, total_available_seats = ?, status = ?
            WHERE id = ?"#,
        )
        .bind(&seat_class.seat_class_name)
        .bind(seat_class.economy_seats)
        .bind(seat_class.economy_seat_price.to_string())
        .bind(seat_class.economy_food_price.to_string())
        .bind(seat_class.economy_available_seats)
        .bind(seat_class.business_seats)
        .bind(seat_class.business_seat_price.to_string())
        .bind(seat_class.business_food_price.to_string())
        .bind(seat_class.business_available_seats)
        .bind(seat_class.first_class_seats)
        .bind(seat_class.first_class_seat_price.to_string())
        .bind(seat_class.first_class_food_price.to_string())
        .bind(seat_class.first_class_available_seats)
        .bind(seat_class.total_seats)
        .bind(seat_class.total_available_seats)
        .bind(seat_class.status.to_string())
        .bind(&seat_class.id)
        .execute(&mut *tx)
        .await?;

        // updates carry no requester; the entity id stands in
        approval_service::open_request(&mut tx, &seat_class.id, ApprovalKind::SeatClass, &seat_class.id)
            .await?;

        tx.commit().await?;
        tracing::info!(seat_class_id, "seat class updated, awaiting approval");
        Ok(seat_class)
    }

    pub async fn delete_seat_class(&self, seat_class_id: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        if fetch_seat_class(&mut tx, seat_class_id).await?.is_none() {
            return Err(AppError::NotFound("Seat class not found.".into()));
        }

        approval_service::close_for_deleted_entity(&mut tx, seat_class_id).await?;

        sqlx::query("DELETE FROM seat_classes WHERE id = ?")
            .bind(seat_class_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(seat_class_id, "seat class deleted");
        Ok(())
    }
}

async fn insert_seat_class(conn: &mut AnyConnection, seat_class: &SeatClass) -> AppResult<()> {
    sqlx::query(&format!(
        "INSERT INTO seat_classes ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        SEAT_CLASS_COLUMNS
    ))
    .bind(&seat_class.id)
    .bind(&seat_class.seat_class_name)
    .bind(seat_class.economy_seats)
    .bind(seat_class.economy_seat_price.to_string())
    .bind(seat_class.economy_food_price.to_string())
    .bind(seat_class.economy_available_seats)
    .bind(seat_class.business_seats)
    .bind(seat_class.business_seat_price.to_string())
    .bind(seat_class.business_food_price.to_string())
    .bind(seat_class.business_available_seats)
    .bind(seat_class.first_class_seats)
    .bind(seat_class.first_class_seat_price.to_string())
    .bind(seat_class.first_class_food_price.to_string())
    .bind(seat_class.first_class_available_seats)
    .bind(seat_class.total_seats)
    .bind(seat_class.total_available_seats)
    .bind(seat_class.status.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(())
}
