use super::{datetime_column, decimal_column, enum_column};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum PaymentMethod {
    Card,
    #[serde(rename = "UPI")]
    #[strum(serialize = "UPI")]
    Upi,
    #[serde(rename = "Net Banking")]
    #[strum(serialize = "Net Banking")]
    NetBanking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum PaymentStatus {
    Paid,
    Pending,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
}

impl<'r> FromRow<'r, AnyRow> for Payment {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Payment {
            id: row.try_get("id")?,
            booking_id: row.try_get("booking_id")?,
            user_id: row.try_get("user_id")?,
            amount: decimal_column(row, "amount")?,
            payment_date: datetime_column(row, "payment_date")?,
            payment_method: enum_column(row, "payment_method")?,
            status: enum_column(row, "status")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreateRequest {
    #[validate(length(min = 1, message = "Booking ID is required"))]
    pub booking_id: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PaymentResponse {
    pub payment: Payment,
}

/// Payment listings answer with a message, not an error, when empty.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PaymentListResponse {
    Payments { payments: Vec<Payment> },
    Empty { message: String },
}
