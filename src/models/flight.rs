use super::{enum_column, optional_text_column, EntityStatus};
use chrono::Weekday;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Which calendar days a flight operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekends,
    /// Every weekday, Monday to Friday
    WeeklyAll,
    Weekly(Weekday),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid recurrence '{0}'. Must be Daily, Weekends, Weekly:All or Weekly:<Day>")]
pub struct RecurrenceParseError(pub String);

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|day| weekday_name(*day) == name)
}

impl FromStr for Recurrence {
    type Err = RecurrenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(Recurrence::Daily),
            "Weekends" => Ok(Recurrence::Weekends),
            "Weekly:All" => Ok(Recurrence::WeeklyAll),
            other => other
                .strip_prefix("Weekly:")
                .and_then(weekday_from_name)
                .map(Recurrence::Weekly)
                .ok_or_else(|| RecurrenceParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Daily => f.write_str("Daily"),
            Recurrence::Weekends => f.write_str("Weekends"),
            Recurrence::WeeklyAll => f.write_str("Weekly:All"),
            Recurrence::Weekly(day) => write!(f, "Weekly:{}", weekday_name(*day)),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub seat_class_id: String,
    pub luggage_capacity: Option<String>,
    pub status: EntityStatus,
    pub recurrence: String,
}

impl<'r> FromRow<'r, AnyRow> for Flight {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Flight {
            id: row.try_get("id")?,
            airline: row.try_get("airline")?,
            flight_number: row.try_get("flight_number")?,
            origin: row.try_get("origin")?,
            destination: row.try_get("destination")?,
            departure_time: row.try_get("departure_time")?,
            arrival_time: row.try_get("arrival_time")?,
            image: optional_text_column(row, "image")?,
            duration: optional_text_column(row, "duration")?,
            seat_class_id: row.try_get("seat_class_id")?,
            luggage_capacity: optional_text_column(row, "luggage_capacity")?,
            status: enum_column(row, "status")?,
            recurrence: row.try_get("recurrence")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FlightCreateRequest {
    #[validate(length(min = 1, message = "Flight number is required"))]
    pub flight_number: String,
    #[validate(length(min = 1, message = "Origin is required"))]
    pub origin: String,
    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: Option<String>,
    pub luggage_capacity: Option<String>,
    pub recurrence: String,
    /// URL or path handed out by the file storage service
    #[validate(length(min = 1, message = "No image provided"))]
    pub image: String,
    #[validate(length(min = 1, message = "Service provider ID is required"))]
    pub service_provider_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlightUpdateRequest {
    pub flight_number: Option<String>,
    pub airline: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub duration: Option<String>,
    pub luggage_capacity: Option<String>,
    pub recurrence: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Cabin that must still have seats left
    pub seat_class: Option<String>,
    pub date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FlightResponse {
    pub flight: Flight,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FlightListResponse {
    pub flights: Vec<Flight>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_recognised_form() {
        assert_eq!("Daily".parse(), Ok(Recurrence::Daily));
        assert_eq!("Weekends".parse(), Ok(Recurrence::Weekends));
        assert_eq!("Weekly:All".parse(), Ok(Recurrence::WeeklyAll));
        assert_eq!("Weekly:Friday".parse(), Ok(Recurrence::Weekly(Weekday::Fri)));
    }

    #[test]
    fn rejects_unknown_forms() {
        assert!("Weekly:Funday".parse::<Recurrence>().is_err());
        assert!("weekly:monday".parse::<Recurrence>().is_err());
        assert!("Weekly:(Mon - Fri)".parse::<Recurrence>().is_err());
        assert!("".parse::<Recurrence>().is_err());
    }

    #[test]
    fn parse_error_names_the_bad_rule() {
        let err: Box<dyn std::error::Error> = Box::new("Weekly:Funday".parse::<Recurrence>().unwrap_err());
        assert_eq!(
            err.to_string(),
            "Invalid recurrence 'Weekly:Funday'. Must be Daily, Weekends, Weekly:All or Weekly:<Day>"
        );
    }

    #[test]
    fn display_matches_stored_form() {
        for raw in ["Daily", "Weekends", "Weekly:All", "Weekly:Sunday"] {
            let rule: Recurrence = raw.parse().unwrap();
            assert_eq!(rule.to_string(), raw);
        }
    }
}
