use super::{datetime_column, id_list_column, optional_text_column};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use validator::Validate;

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub role: String,
    pub created_on: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub bookings: Vec<String>,
    /// Optimistic concurrency token for the booking list
    #[serde(skip)]
    pub version: i64,
}

impl<'r> FromRow<'r, AnyRow> for User {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            phone: optional_text_column(row, "phone")?,
            image: optional_text_column(row, "image")?,
            role: row.try_get("role")?,
            created_on: datetime_column(row, "created_on")?,
            last_login: datetime_column(row, "last_login")?,
            bookings: id_list_column(row, "bookings")?,
            version: row.try_get("version")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub created_on: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub seat_class: Vec<String>,
    pub flights: Vec<String>,
    #[serde(skip)]
    pub version: i64,
}

impl<'r> FromRow<'r, AnyRow> for ServiceProvider {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(ServiceProvider {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            phone: optional_text_column(row, "phone")?,
            logo: optional_text_column(row, "logo")?,
            created_on: datetime_column(row, "created_on")?,
            last_login: datetime_column(row, "last_login")?,
            seat_class: id_list_column(row, "seat_classes")?,
            flights: id_list_column(row, "flights")?,
            version: row.try_get("version")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistrationRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    pub image: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "Customer".to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderRegistrationRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderResponse {
    pub service_provider: ServiceProvider,
}
