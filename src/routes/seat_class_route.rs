use crate::models::seat_class::{
    SeatClassCreateRequest, SeatClassListResponse, SeatClassResponse, SeatClassUpdateRequest,
};
use crate::models::MessageResponse;
use crate::services::seat_class_service::SeatClassService;
use crate::utils::error::AppError;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

#[openapi(tag = "Seat Classes")]
#[post("/seat-classes", format = "json", data = "<request>")]
pub async fn create_seat_class(
    request: Json<SeatClassCreateRequest>,
    seat_class_service: &State<SeatClassService>,
) -> Result<Created<Json<SeatClassResponse>>, AppError> {
    let seat_class = seat_class_service
        .create_seat_class(request.into_inner())
        .await?;
    let location = format!("/api/seat-classes/{}", seat_class.id);
    Ok(Created::new(location).body(Json(SeatClassResponse { seat_class })))
}

#[openapi(tag = "Seat Classes")]
#[get("/seat-classes")]
pub async fn list_seat_classes(
    seat_class_service: &State<SeatClassService>,
) -> Result<Json<SeatClassListResponse>, AppError> {
    let seat_classes = seat_class_service.list_seat_classes().await?;
    Ok(Json(SeatClassListResponse { seat_classes }))
}

#[openapi(tag = "Seat Classes")]
#[get("/seat-classes/<seat_class_id>")]
pub async fn get_seat_class(
    seat_class_id: &str,
    seat_class_service: &State<SeatClassService>,
) -> Result<Json<SeatClassResponse>, AppError> {
    let seat_class = seat_class_service.get_seat_class(seat_class_id).await?;
    Ok(Json(SeatClassResponse { seat_class }))
}

#[openapi(tag = "Seat Classes")]
#[put("/seat-classes/<seat_class_id>", format = "json", data = "<request>")]
pub async fn update_seat_class(
    seat_class_id: &str,
    request: Json<SeatClassUpdateRequest>,
    seat_class_service: &State<SeatClassService>,
) -> Result<Json<SeatClassResponse>, AppError> {
    let seat_class = seat_class_service
        .update_seat_class(seat_class_id, request.into_inner())
        .await?;
    Ok(Json(SeatClassResponse { seat_class }))
}

#[openapi(tag = "Seat Classes")]
#[delete("/seat-classes/<seat_class_id>")]
pub async fn delete_seat_class(
    seat_class_id: &str,
    seat_class_service: &State<SeatClassService>,
) -> Result<Json<MessageResponse>, AppError> {
    seat_class_service.delete_seat_class(seat_class_id).await?;
    Ok(Json(MessageResponse::new("Seat class deleted successfully.")))
}
