use super::passenger::Passenger;
use super::{date_column, datetime_column, decimal_column, enum_column, id_list_column};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum BookingStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    #[serde(rename = "flight")]
    pub flight_id: String,
    #[serde(rename = "passenger")]
    pub passenger_ids: Vec<String>,
    pub total_price: Decimal,
    pub booking_date: DateTime<Utc>,
    pub specific_date: NaiveDate,
    pub status: BookingStatus,
}

impl<'r> FromRow<'r, AnyRow> for Booking {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Booking {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            flight_id: row.try_get("flight_id")?,
            passenger_ids: id_list_column(row, "passenger_ids")?,
            total_price: decimal_column(row, "total_price")?,
            booking_date: datetime_column(row, "booking_date")?,
            specific_date: date_column(row, "specific_date")?,
            status: enum_column(row, "status")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreateRequest {
    pub flight: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub passenger: Vec<String>,
    pub specific_date: NaiveDate,
}

/// A booking with its passenger records resolved.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub passengers: Vec<Passenger>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingResponse {
    pub booking: Booking,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingDetailResponse {
    pub booking: BookingDetail,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<Booking>,
}
