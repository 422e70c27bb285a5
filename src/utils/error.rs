use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::Request;
use rocket::Response;
use rocket_okapi::JsonSchema;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Serialize, JsonSchema)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("User ID is required.")]
    MissingUser,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    // Optimistic-concurrency violation; the only retryable class
    #[error("Write conflict: {0}")]
    WriteConflict(String),
}

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::MissingUser => Status::BadRequest,
            AppError::Unavailable(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::AuthError(_) => Status::Unauthorized,
            AppError::Conflict(_) => Status::Conflict,
            AppError::WriteConflict(_) => Status::Conflict,
            AppError::DatabaseError(_) => Status::InternalServerError,
        }
    }

    pub fn is_write_conflict(&self) -> bool {
        matches!(self, AppError::WriteConflict(_))
    }
}

// SQLSTATE 40001 covers MySQL deadlocks, 5/6/517 are SQLite busy/locked codes
const WRITE_CONFLICT_CODES: [&str; 4] = ["40001", "5", "6", "517"];

// Convert sqlx::Error (database error) to the matching AppError class
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("Duplicate key: {}", db_err.message()));
            }
            if let Some(code) = db_err.code() {
                if WRITE_CONFLICT_CODES.contains(&code.as_ref()) {
                    return AppError::WriteConflict(db_err.message().to_string());
                }
            }
        }
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DatabaseError(format!("Corrupt list field: {}", err))
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;

// Format all errors at route level as a JSON `{message}` body
#[rocket::async_trait]
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(error = %self, "request failed");
        }

        let json = json!({
            "message": self.to_string()
        });

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(None, Cursor::new(json.to_string()))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_class() {
        assert_eq!(AppError::MissingUser.status(), Status::BadRequest);
        assert_eq!(AppError::NotFound("x".into()).status(), Status::NotFound);
        assert_eq!(AppError::Conflict("x".into()).status(), Status::Conflict);
        assert_eq!(AppError::Unavailable("x".into()).status(), Status::BadRequest);
        assert_eq!(
            AppError::DatabaseError("x".into()).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn only_write_conflicts_are_retryable() {
        assert!(AppError::WriteConflict("stale".into()).is_write_conflict());
        assert!(!AppError::Conflict("duplicate".into()).is_write_conflict());
        assert!(!AppError::DatabaseError("down".into()).is_write_conflict());
    }

    #[test]
    fn plain_sqlx_errors_become_database_errors() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
