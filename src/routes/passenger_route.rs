use crate::models::passenger::{
    PassengerCreateRequest, PassengerListResponse, PassengerResponse, PassengerUpdateRequest,
};
use crate::models::MessageResponse;
use crate::services::passenger_service::PassengerService;
use crate::utils::error::AppError;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Register a passenger; an earlier record with the same name, age and gender is replaced
#[openapi(tag = "Passengers")]
#[post("/passengers", format = "json", data = "<request>")]
pub async fn create_passenger(
    request: Json<PassengerCreateRequest>,
    passenger_service: &State<PassengerService>,
) -> Result<Created<Json<PassengerResponse>>, AppError> {
    let passenger = passenger_service
        .create_passenger(request.into_inner())
        .await?;
    let location = format!("/api/passengers/{}", passenger.id);
    Ok(Created::new(location).body(Json(PassengerResponse { passenger })))
}

#[openapi(tag = "Passengers")]
#[get("/passengers")]
pub async fn list_passengers(
    passenger_service: &State<PassengerService>,
) -> Result<Json<PassengerListResponse>, AppError> {
    let passengers = passenger_service.list_passengers().await?;
    Ok(Json(PassengerListResponse { passengers }))
}

#[openapi(tag = "Passengers")]
#[get("/passengers/<passenger_id>")]
pub async fn get_passenger(
    passenger_id: &str,
    passenger_service: &State<PassengerService>,
) -> Result<Json<PassengerResponse>, AppError> {
    let passenger = passenger_service.get_passenger(passenger_id).await?;
    Ok(Json(PassengerResponse { passenger }))
}

#[openapi(tag = "Passengers")]
#[put("/passengers/<passenger_id>", format = "json", data = "<request>")]
pub async fn update_passenger(
    passenger_id: &str,
    request: Json<PassengerUpdateRequest>,
    passenger_service: &State<PassengerService>,
) -> Result<Json<PassengerResponse>, AppError> {
    let passenger = passenger_service
        .update_passenger(passenger_id, request.into_inner())
        .await?;
    Ok(Json(PassengerResponse { passenger }))
}

#[openapi(tag = "Passengers")]
#[delete("/passengers/<passenger_id>")]
pub async fn delete_passenger(
    passenger_id: &str,
    passenger_service: &State<PassengerService>,
) -> Result<Json<MessageResponse>, AppError> {
    passenger_service.delete_passenger(passenger_id).await?;
    Ok(Json(MessageResponse::new("Passenger deleted successfully.")))
}
