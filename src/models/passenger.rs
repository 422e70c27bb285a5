use super::optional_text_column;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum MealChoice {
    Yes,
    No,
}

/// Fare category; everything except `Normal` is discount eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum PassengerCategory {
    Normal,
    Student,
    #[serde(rename = "Senior Citizen")]
    #[strum(serialize = "Senior Citizen")]
    SeniorCitizen,
    Disabled,
    Army,
    Doctor,
}

impl PassengerCategory {
    pub fn is_discount_eligible(self) -> bool {
        !matches!(self, PassengerCategory::Normal)
    }
}

/// Per-booking traveller record. Enumerated fields keep their stored text;
/// they are checked on write and again when priced.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub phone: Option<String>,
    pub gender: String,
    pub seat_class: String,
    pub food: String,
    #[serde(rename = "type")]
    pub category: String,
}

impl<'r> FromRow<'r, AnyRow> for Passenger {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Passenger {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            phone: optional_text_column(row, "phone")?,
            gender: row.try_get("gender")?,
            seat_class: row.try_get("seat_class")?,
            food: row.try_get("food")?,
            category: row.try_get("category")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PassengerCreateRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 150, message = "Age is out of range"))]
    pub age: i64,
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,
    pub phone: Option<String>,
    pub seat_class: String,
    pub food: String,
    #[serde(rename = "type", default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    PassengerCategory::Normal.to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PassengerUpdateRequest {
    pub name: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age is out of range"))]
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub seat_class: String,
    pub food: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PassengerResponse {
    pub passenger: Passenger,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PassengerListResponse {
    pub passengers: Vec<Passenger>,
}
