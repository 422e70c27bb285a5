use crate::models::booking::BookingStatus;
use crate::models::payment::{Payment, PaymentCreateRequest, PaymentMethod, PaymentStatus};
use crate::models::{new_id, timestamp};
use crate::services::booking_service::fetch_booking;
use crate::utils::error::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::AnyPool;
use std::str::FromStr;
use validator::Validate;

const PAYMENT_COLUMNS: &str = "id, booking_id, user_id, amount, payment_date, payment_method, status";

/// Booking price plus the 5% platform fee added at payment time.
pub fn amount_due(total_price: Decimal) -> AppResult<Decimal> {
    total_price
        .checked_mul(Decimal::new(5, 2))
        .and_then(|fee| total_price.checked_add(fee))
        .ok_or_else(|| {
            AppError::ValidationError("Payment amount exceeds the supported range.".into())
        })
}

#[derive(Clone)]
pub struct PaymentService {
    pool: AnyPool,
}

impl PaymentService {
    pub fn new(pool: AnyPool) -> Self {
        PaymentService { pool }
    }

    /// Records the single payment of a booking. The fee is folded into the
    /// booking's stored price, which is then marked Paid.
    pub async fn create_payment(&self, request: PaymentCreateRequest) -> AppResult<Payment> {
        request.validate()?;
        let method = PaymentMethod::from_str(&request.payment_method).map_err(|_| {
            AppError::ValidationError(
                "Invalid payment method. Must be one of: Card, UPI, Net Banking.".into(),
            )
        })?;

        let mut tx = self.pool.begin().await?;

        let booking = fetch_booking(&mut tx, &request.booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

        let existing = sqlx::query("SELECT id FROM payments WHERE booking_id = ?")
            .bind(&booking.id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() || booking.status == BookingStatus::Paid {
            tracing::warn!(booking_id = %booking.id, "duplicate payment attempt");
            return Err(AppError::Conflict(
                "Payment for this booking already exists.".into(),
            ));
        }

        let amount = amount_due(booking.total_price)?;
        let payment = Payment {
            id: new_id(),
            booking_id: booking.id.clone(),
            user_id: booking.user_id.clone(),
            amount,
            payment_date: Utc::now(),
            payment_method: method,
            status: PaymentStatus::Paid,
        };

        // a racing duplicate trips the unique key on booking_id here
        sqlx::query(&format!(
            "INSERT INTO payments ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            PAYMENT_COLUMNS
        ))
        .bind(&payment.id)
        .bind(&payment.booking_id)
        .bind(&payment.user_id)
        .bind(payment.amount.to_string())
        .bind(timestamp(payment.payment_date))
        .bind(payment.payment_method.to_string())
        .bind(payment.status.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE bookings SET status = ?, total_price = ? WHERE id = ?")
            .bind(BookingStatus::Paid.to_string())
            .bind(amount.to_string())
            .bind(&booking.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(payment_id = %payment.id, booking_id = %payment.booking_id, amount = %amount, "payment recorded");
        Ok(payment)
    }

    pub async fn delete_payment(&self, payment_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(payment_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Payment not found.".into()));
        }
        tracing::info!(payment_id, "payment deleted");
        Ok(())
    }

    /// Possibly empty; callers answer an empty list with a message.
    pub async fn list_payments_by_user(&self, user_id: &str) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE user_id = ? ORDER BY payment_date",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn list_payments(&self) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments ORDER BY payment_date",
            PAYMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }
}
