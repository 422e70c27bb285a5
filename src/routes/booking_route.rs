use crate::models::booking::{
    BookingCreateRequest, BookingDetailResponse, BookingListResponse, BookingResponse,
};
use crate::models::MessageResponse;
use crate::services::booking_service::BookingService;
use crate::utils::error::AppError;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Book a flight for a user on a given date
#[openapi(tag = "Bookings")]
#[post("/bookings", format = "json", data = "<request>")]
pub async fn create_booking(
    request: Json<BookingCreateRequest>,
    booking_service: &State<BookingService>,
) -> Result<Created<Json<BookingResponse>>, AppError> {
    let booking = booking_service.create_booking(request.into_inner()).await?;
    let location = format!("/api/bookings/{}", booking.id);
    Ok(Created::new(location).body(Json(BookingResponse { booking })))
}

/// Cancel a booking
#[openapi(tag = "Bookings")]
#[delete("/bookings/<booking_id>")]
pub async fn delete_booking(
    booking_id: &str,
    booking_service: &State<BookingService>,
) -> Result<Json<MessageResponse>, AppError> {
    booking_service.delete_booking(booking_id).await?;
    Ok(Json(MessageResponse::new("Booking deleted successfully.")))
}

/// Booking with its passengers
#[openapi(tag = "Bookings")]
#[get("/bookings/<booking_id>")]
pub async fn get_booking(
    booking_id: &str,
    booking_service: &State<BookingService>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let booking = booking_service.get_booking(booking_id).await?;
    Ok(Json(BookingDetailResponse { booking }))
}

#[openapi(tag = "Bookings")]
#[get("/bookings")]
pub async fn list_bookings(
    booking_service: &State<BookingService>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = booking_service.list_bookings().await?;
    Ok(Json(BookingListResponse { bookings }))
}
