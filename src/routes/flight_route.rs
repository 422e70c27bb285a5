use crate::models::flight::{
    FlightCreateRequest, FlightListResponse, FlightResponse, FlightSearchQuery,
    FlightUpdateRequest,
};
use crate::models::MessageResponse;
use crate::services::flight_service::FlightService;
use crate::utils::error::AppError;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Submit a new flight for approval
#[openapi(tag = "Flights")]
#[post("/flights", format = "json", data = "<request>")]
pub async fn create_flight(
    request: Json<FlightCreateRequest>,
    flight_service: &State<FlightService>,
) -> Result<Created<Json<FlightResponse>>, AppError> {
    let flight = flight_service.create_flight(request.into_inner()).await?;
    let location = format!("/api/flights/{}", flight.id);
    Ok(Created::new(location).body(Json(FlightResponse { flight })))
}

#[openapi(tag = "Flights")]
#[get("/flights")]
pub async fn list_flights(
    flight_service: &State<FlightService>,
) -> Result<Json<FlightListResponse>, AppError> {
    let flights = flight_service.list_flights().await?;
    Ok(Json(FlightListResponse { flights }))
}

#[openapi(tag = "Flights")]
#[get("/flights/<flight_id>")]
pub async fn get_flight(
    flight_id: &str,
    flight_service: &State<FlightService>,
) -> Result<Json<FlightResponse>, AppError> {
    let flight = flight_service.get_flight(flight_id).await?;
    Ok(Json(FlightResponse { flight }))
}

/// Update a flight; the change goes back through approval
#[openapi(tag = "Flights")]
#[put("/flights/<flight_id>", format = "json", data = "<request>")]
pub async fn update_flight(
    flight_id: &str,
    request: Json<FlightUpdateRequest>,
    flight_service: &State<FlightService>,
) -> Result<Json<FlightResponse>, AppError> {
    let flight = flight_service
        .update_flight(flight_id, request.into_inner())
        .await?;
    Ok(Json(FlightResponse { flight }))
}

#[openapi(tag = "Flights")]
#[delete("/flights/<flight_id>")]
pub async fn delete_flight(
    flight_id: &str,
    flight_service: &State<FlightService>,
) -> Result<Json<MessageResponse>, AppError> {
    flight_service.delete_flight(flight_id).await?;
    Ok(Json(MessageResponse::new("Flight deleted successfully.")))
}

/// Search flights by route, travel date and cabin with seats left
#[openapi(tag = "Flights")]
#[post("/flights/search", format = "json", data = "<query>")]
pub async fn search_flights(
    query: Json<FlightSearchQuery>,
    flight_service: &State<FlightService>,
) -> Result<Json<FlightListResponse>, AppError> {
    let flights = flight_service.search_flights(query.into_inner()).await?;
    Ok(Json(FlightListResponse { flights }))
}
