pub mod approval;
pub mod booking;
pub mod flight;
pub mod passenger;
pub mod payment;
pub mod seat_class;
pub mod user;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Review state of a flight or seat class record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum EntityStatus {
    Approved,
    #[serde(rename = "Awaiting Approval")]
    #[strum(serialize = "Awaiting Approval")]
    AwaitingApproval,
}

/// Plain message body, used where the API answers without a payload.
#[derive(Debug, Serialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// Timestamps are stored as fixed-width RFC 3339 text so they sort lexically
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn column_error<E>(column: &str, err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

pub(crate) fn decimal_column(row: &AnyRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(raw.trim()).map_err(|e| column_error(column, e))
}

pub(crate) fn datetime_column(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| column_error(column, e))
}

// The Any driver cannot decode NULL into Option<T>, so nullable columns are
// checked for NULL before decoding
pub(crate) fn optional_text_column(row: &AnyRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    row.try_get::<String, _>(column).map(Some)
}

pub(crate) fn optional_datetime_column(
    row: &AnyRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    optional_text_column(row, column)?
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|e| column_error(column, e))
        })
        .transpose()
}

pub(crate) fn date_column(row: &AnyRow, column: &str) -> Result<NaiveDate, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| column_error(column, e))
}

pub(crate) fn id_list_column(row: &AnyRow, column: &str) -> Result<Vec<String>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).map_err(|e| column_error(column, e))
}

pub(crate) fn enum_column<T>(row: &AnyRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = strum::ParseError>,
{
    let raw: String = row.try_get(column)?;
    T::from_str(&raw).map_err(|e| column_error(column, e))
}
