#![allow(dead_code)]

use airline_backoffice::config::AppConfig;
use airline_backoffice::db::Database;
use airline_backoffice::models::flight::{Flight, FlightCreateRequest};
use airline_backoffice::models::passenger::{Passenger, PassengerCreateRequest};
use airline_backoffice::models::seat_class::{SeatClass, SeatClassCreateRequest};
use airline_backoffice::models::user::{
    ServiceProvider, ServiceProviderRegistrationRequest, User, UserRegistrationRequest,
};
use airline_backoffice::services::flight_service::FlightService;
use airline_backoffice::services::passenger_service::PassengerService;
use airline_backoffice::services::seat_class_service::SeatClassService;
use airline_backoffice::services::user_service::UserService;
use airline_backoffice::utils::error::AppError;
use rust_decimal::Decimal;
use sqlx::AnyPool;
use std::path::PathBuf;
use std::time::Duration;

// Lowest cost bcrypt accepts; keeps registration fast in debug builds
pub const TEST_HASH_COST: u32 = 4;

/// A fresh in-memory database with the schema applied. Every test gets its
/// own, so tests never see each other's rows.
pub struct TestDb {
    pub db: Database,
    pub pool: AnyPool,
}

impl TestDb {
    pub async fn new() -> Result<Self, sqlx::Error> {
        let db = Database::in_memory().await?;
        let pool = db.get_pool().clone();
        Ok(TestDb { db, pool })
    }

    pub async fn count(&self, table: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// A SQLite file with a multi-connection pool, for tests where writers must
/// run on separate connections. `remove` deletes the file.
pub struct FileTestDb {
    pub pool: AnyPool,
    path: PathBuf,
}

impl FileTestDb {
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let path = std::env::temp_dir().join(format!("airline-backoffice-{}.db", uuid::Uuid::new_v4()));
        let config = AppConfig {
            database_url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections,
            acquire_timeout: Duration::from_secs(30),
            auto_migrate: true,
            bcrypt_cost: TEST_HASH_COST,
        };
        let db = Database::new(&config).await?;
        db.migrate().await?;
        Ok(FileTestDb {
            pool: db.get_pool().clone(),
            path,
        })
    }

    pub async fn remove(self) {
        self.pool.close().await;
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("db-journal"));
    }
}

pub async fn register_user(pool: &AnyPool, email: &str) -> Result<User, AppError> {
    UserService::new(pool.clone())
        .with_hash_cost(TEST_HASH_COST)
        .register_user(UserRegistrationRequest {
            name: "Test Customer".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            phone: "9876543210".to_string(),
            image: None,
            role: "Customer".to_string(),
        })
        .await
}

pub async fn register_provider(pool: &AnyPool, email: &str) -> Result<ServiceProvider, AppError> {
    UserService::new(pool.clone())
        .with_hash_cost(TEST_HASH_COST)
        .register_service_provider(ServiceProviderRegistrationRequest {
            name: "Sky Air".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            phone: "9876500000".to_string(),
            logo: None,
        })
        .await
}

/// Economy 1000 + meal 250, Business 4000 + 400, First 10000 + 1000.
pub fn seat_class_request(name: &str, provider_id: &str) -> SeatClassCreateRequest {
    SeatClassCreateRequest {
        seat_class_name: name.to_string(),
        economy_seats: 100,
        economy_seat_price: Decimal::new(1000, 0),
        economy_food_price: Decimal::new(250, 0),
        economy_available_seats: 100,
        business_seats: 10,
        business_seat_price: Decimal::new(4000, 0),
        business_food_price: Decimal::new(400, 0),
        business_available_seats: 10,
        first_class_seats: 4,
        first_class_seat_price: Decimal::new(10000, 0),
        first_class_food_price: Decimal::new(1000, 0),
        first_class_available_seats: 0,
        service_provider_id: provider_id.to_string(),
    }
}

pub async fn create_seat_class(
    pool: &AnyPool,
    name: &str,
    provider_id: &str,
) -> Result<SeatClass, AppError> {
    SeatClassService::new(pool.clone())
        .create_seat_class(seat_class_request(name, provider_id))
        .await
}

pub fn flight_request(flight_number: &str, provider_id: &str, recurrence: &str) -> FlightCreateRequest {
    FlightCreateRequest {
        flight_number: flight_number.to_string(),
        origin: "Delhi".to_string(),
        destination: "Mumbai".to_string(),
        departure_time: "09:30".to_string(),
        arrival_time: "11:45".to_string(),
        duration: Some("2h 15m".to_string()),
        luggage_capacity: Some("25kg".to_string()),
        recurrence: recurrence.to_string(),
        image: "https://cdn.example.com/flights/plane.png".to_string(),
        service_provider_id: provider_id.to_string(),
    }
}

/// Creates the seat class named after the flight number, then the flight.
pub async fn create_flight(
    pool: &AnyPool,
    flight_number: &str,
    provider_id: &str,
    recurrence: &str,
) -> Result<Flight, AppError> {
    create_seat_class(pool, flight_number, provider_id).await?;
    FlightService::new(pool.clone())
        .create_flight(flight_request(flight_number, provider_id, recurrence))
        .await
}

pub async fn create_passenger(
    pool: &AnyPool,
    name: &str,
    cabin: &str,
    food: &str,
    category: &str,
) -> Result<Passenger, AppError> {
    PassengerService::new(pool.clone())
        .create_passenger(PassengerCreateRequest {
            name: name.to_string(),
            age: 30,
            gender: "Female".to_string(),
            phone: None,
            seat_class: cabin.to_string(),
            food: food.to_string(),
            category: category.to_string(),
        })
        .await
}
