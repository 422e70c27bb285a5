#[macro_use]
extern crate rocket;
extern crate rocket_okapi;

pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod swagger;
pub mod utils;

use crate::db::Database;
use crate::models::MessageResponse;
use crate::services::approval_service::ApprovalService;
use crate::services::booking_service::BookingService;
use crate::services::flight_service::FlightService;
use crate::services::passenger_service::PassengerService;
use crate::services::payment_service::PaymentService;
use crate::services::seat_class_service::SeatClassService;
use crate::services::user_service::UserService;
use crate::swagger::swagger_ui;
use rocket::fairing::AdHoc;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::make_swagger_ui;

#[catch(404)]
fn not_found() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Could not find the page you were looking for",
    ))
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<MessageResponse>) {
    let reason = status.reason().unwrap_or("Something went wrong");
    (status, Json(MessageResponse::new(reason)))
}

/// Assembles the server: one managed service per resource, the public API
/// under `/api`, approval review under `/admin`.
pub fn build_rocket(db: Database, bcrypt_cost: u32) -> Rocket<Build> {
    let pool = db.get_pool().clone();

    rocket::build()
        .manage(UserService::new(pool.clone()).with_hash_cost(bcrypt_cost))
        .manage(SeatClassService::new(pool.clone()))
        .manage(FlightService::new(pool.clone()))
        .manage(PassengerService::new(pool.clone()))
        .manage(BookingService::new(pool.clone()))
        .manage(PaymentService::new(pool.clone()))
        .manage(ApprovalService::new(pool))
        .mount(
            "/api",
            openapi_get_routes![
                routes::user_route::register_user,
                routes::user_route::login_user,
                routes::user_route::get_user,
                routes::user_route::register_service_provider,
                routes::user_route::login_service_provider,
                routes::user_route::get_service_provider,
                routes::seat_class_route::create_seat_class,
                routes::seat_class_route::list_seat_classes,
                routes::seat_class_route::get_seat_class,
                routes::seat_class_route::update_seat_class,
                routes::seat_class_route::delete_seat_class,
                routes::flight_route::create_flight,
                routes::flight_route::list_flights,
                routes::flight_route::get_flight,
                routes::flight_route::update_flight,
                routes::flight_route::delete_flight,
                routes::flight_route::search_flights,
                routes::passenger_route::create_passenger,
                routes::passenger_route::list_passengers,
                routes::passenger_route::get_passenger,
                routes::passenger_route::update_passenger,
                routes::passenger_route::delete_passenger,
                routes::booking_route::create_booking,
                routes::booking_route::delete_booking,
                routes::booking_route::get_booking,
                routes::booking_route::list_bookings,
                routes::payment_route::create_payment,
                routes::payment_route::delete_payment,
                routes::payment_route::list_user_payments,
                routes::payment_route::list_payments,
            ],
        )
        .mount(
            "/admin",
            openapi_get_routes![
                routes::admin_route::list_pending,
                routes::admin_route::list_all,
                routes::admin_route::approve,
                routes::admin_route::reject,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .register("/", catchers![not_found, default_catcher])
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
                res.set_header(Header::new(
                    "Access-Control-Allow-Methods",
                    "GET, POST, PUT, PATCH, DELETE, OPTIONS",
                ));
                res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
            })
        }))
}
