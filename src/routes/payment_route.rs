use crate::models::payment::{PaymentCreateRequest, PaymentListResponse, PaymentResponse};
use crate::models::MessageResponse;
use crate::services::payment_service::PaymentService;
use crate::utils::error::AppError;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Pay for a booking; a booking can be paid once
#[openapi(tag = "Payments")]
#[post("/payments", format = "json", data = "<request>")]
pub async fn create_payment(
    request: Json<PaymentCreateRequest>,
    payment_service: &State<PaymentService>,
) -> Result<Created<Json<PaymentResponse>>, AppError> {
    let payment = payment_service.create_payment(request.into_inner()).await?;
    let location = format!("/api/payments/{}", payment.id);
    Ok(Created::new(location).body(Json(PaymentResponse { payment })))
}

#[openapi(tag = "Payments")]
#[delete("/payments/<payment_id>")]
pub async fn delete_payment(
    payment_id: &str,
    payment_service: &State<PaymentService>,
) -> Result<Json<MessageResponse>, AppError> {
    payment_service.delete_payment(payment_id).await?;
    Ok(Json(MessageResponse::new("Payment deleted successfully.")))
}

/// Payments made by one user
#[openapi(tag = "Payments")]
#[get("/payments/user/<user_id>")]
pub async fn list_user_payments(
    user_id: &str,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentListResponse>, AppError> {
    let payments = payment_service.list_payments_by_user(user_id).await?;
    if payments.is_empty() {
        return Ok(Json(PaymentListResponse::Empty {
            message: "No payments done.".to_string(),
        }));
    }
    Ok(Json(PaymentListResponse::Payments { payments }))
}

#[openapi(tag = "Payments")]
#[get("/payments")]
pub async fn list_payments(
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentListResponse>, AppError> {
    let payments = payment_service.list_payments().await?;
    if payments.is_empty() {
        return Ok(Json(PaymentListResponse::Empty {
            message: "No payments found.".to_string(),
        }));
    }
    Ok(Json(PaymentListResponse::Payments { payments }))
}
