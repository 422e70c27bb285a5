pub mod approval_service;
pub mod availability;
pub mod booking_service;
pub mod flight_service;
pub mod passenger_service;
pub mod payment_service;
pub mod pricing;
pub mod seat_class_service;
pub mod user_service;
