use crate::models::booking::{Booking, BookingCreateRequest, BookingDetail, BookingStatus};
use crate::models::{date_text, new_id, timestamp};
use crate::services::availability;
use crate::services::flight_service::fetch_flight;
use crate::services::passenger_service::{fetch_existing_passengers, fetch_passengers};
use crate::services::pricing;
use crate::services::seat_class_service::fetch_seat_class;
use crate::services::user_service::{fetch_user, store_user_bookings};
use crate::utils::error::{AppError, AppResult};
use crate::utils::retry::{retry_when, RetryPolicy};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::AnyPool;
use sqlx::AnyConnection;

pub(crate) const BOOKING_COLUMNS: &str =
    "id, user_id, flight_id, passenger_ids, total_price, booking_date, specific_date, status";

pub(crate) async fn fetch_booking(conn: &mut AnyConnection, booking_id: &str) -> AppResult<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {} FROM bookings WHERE id = ?",
        BOOKING_COLUMNS
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(booking)
}

/// A booking that passed validation and pricing, ready to be written.
struct PricedBooking<'a> {
    user_id: &'a str,
    flight_id: &'a str,
    passenger_ids: Vec<String>,
    total_price: Decimal,
    specific_date: NaiveDate,
}

#[derive(Clone)]
pub struct BookingService {
    pool: AnyPool,
    retry: RetryPolicy,
}

impl BookingService {
    pub fn new(pool: AnyPool) -> Self {
        BookingService {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    /// Validates and prices a booking, then writes the booking and the
    /// owner's booking list in one transaction.
    pub async fn create_booking(&self, request: BookingCreateRequest) -> AppResult<Booking> {
        let user_id = request
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(AppError::MissingUser)?;
        if request.passenger.is_empty() {
            return Err(AppError::ValidationError(
                "At least one passenger is required.".into(),
            ));
        }

        // reads go through one pooled connection, released before the write
        let (flight_id, passenger_ids, total_price) = {
            let mut conn = self.pool.acquire().await?;

            let flight = fetch_flight(&mut conn, &request.flight)
                .await?
                .ok_or_else(|| AppError::NotFound("Flight not found.".into()))?;

            if !availability::is_available(&flight.recurrence, request.specific_date) {
                tracing::warn!(
                    flight_id = %flight.id,
                    recurrence = %flight.recurrence,
                    date = %request.specific_date,
                    "flight not operating on requested date"
                );
                return Err(AppError::Unavailable(
                    "Flight cannot be booked on this date.".into(),
                ));
            }

            let seat_class = fetch_seat_class(&mut conn, &flight.seat_class_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Seat class for this flight not found.".into()))?;

            let passengers = fetch_passengers(&mut conn, &request.passenger).await?;
            let total_price = pricing::booking_total(&passengers, &seat_class)?;
            let passenger_ids: Vec<String> = passengers.into_iter().map(|p| p.id).collect();

            (flight.id, passenger_ids, total_price)
        };

        let priced = PricedBooking {
            user_id: &user_id,
            flight_id: &flight_id,
            passenger_ids,
            total_price,
            specific_date: request.specific_date,
        };

        let booking = retry_when(self.retry, AppError::is_write_conflict, || {
            self.persist_booking(&priced)
        })
        .await
        .map_err(|err| err.into_app_error("Creating booking"))?;

        tracing::info!(
            booking_id = %booking.id,
            user_id = %booking.user_id,
            total_price = %booking.total_price,
            "booking created"
        );
        Ok(booking)
    }

    async fn persist_booking(&self, priced: &PricedBooking<'_>) -> AppResult<Booking> {
        let booking = Booking {
            id: new_id(),
            user_id: priced.user_id.to_string(),
            flight_id: priced.flight_id.to_string(),
            passenger_ids: priced.passenger_ids.clone(),
            total_price: priced.total_price,
            booking_date: Utc::now(),
            specific_date: priced.specific_date,
            status: BookingStatus::Pending,
        };

        let mut tx = self.pool.begin().await?;
        match insert_and_link(&mut tx, &booking).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(booking)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "booking rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Unlinks the booking from its owner and deletes it, atomically.
    /// Concurrent writes to the owner are retried from a fresh read.
    pub async fn delete_booking(&self, booking_id: &str) -> AppResult<()> {
        retry_when(self.retry, AppError::is_write_conflict, || {
            self.delete_once(booking_id)
        })
        .await
        .map_err(|err| err.into_app_error("Deleting booking"))?;

        tracing::info!(booking_id, "booking deleted");
        Ok(())
    }

    async fn delete_once(&self, booking_id: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        match unlink_and_delete(&mut tx, booking_id).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "booking rollback failed");
                }
                Err(err)
            }
        }
    }

    pub async fn get_booking(&self, booking_id: &str) -> AppResult<BookingDetail> {
        let mut conn = self.pool.acquire().await?;
        let booking = fetch_booking(&mut conn, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;
        // passengers are disposable and may have been replaced since
        let passengers = fetch_existing_passengers(&mut conn, &booking.passenger_ids).await?;
        Ok(BookingDetail { booking, passengers })
    }

    /// Every booking; an empty collection is reported as NotFound.
    pub async fn list_bookings(&self) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings ORDER BY booking_date",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        if bookings.is_empty() {
            return Err(AppError::NotFound("No Bookings found.".into()));
        }
        Ok(bookings)
    }
}

async fn insert_and_link(conn: &mut AnyConnection, booking: &Booking) -> AppResult<()> {
    let user = fetch_user(conn, &booking.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    sqlx::query(&format!(
        "INSERT INTO bookings ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        BOOKING_COLUMNS
    ))
    .bind(&booking.id)
    .bind(&booking.user_id)
    .bind(&booking.flight_id)
    .bind(serde_json::to_string(&booking.passenger_ids)?)
    .bind(booking.total_price.to_string())
    .bind(timestamp(booking.booking_date))
    .bind(date_text(booking.specific_date))
    .bind(booking.status.to_string())
    .execute(&mut *conn)
    .await?;

    let mut bookings = user.bookings.clone();
    bookings.push(booking.id.clone());
    store_user_bookings(conn, &user, &bookings).await
}

async fn unlink_and_delete(conn: &mut AnyConnection, booking_id: &str) -> AppResult<()> {
    let booking = fetch_booking(conn, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    match fetch_user(conn, &booking.user_id).await? {
        Some(user) => {
            let bookings: Vec<String> = user
                .bookings
                .iter()
                .filter(|id| id.as_str() != booking_id)
                .cloned()
                .collect();
            store_user_bookings(conn, &user, &bookings).await?;
        }
        None => {
            tracing::warn!(booking_id, user_id = %booking.user_id, "booking owner is gone, nothing to unlink");
        }
    }

    let deleted = sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(booking_id)
        .execute(&mut *conn)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::WriteConflict(format!(
            "booking {} was deleted concurrently",
            booking_id
        )));
    }
    Ok(())
}
