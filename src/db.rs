use crate::config::AppConfig;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::time::Duration;

// Portable DDL: runs unchanged on MySQL and SQLite
const SCHEMA: [&str; 8] = [
    "CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        phone VARCHAR(64) NULL,
        image VARCHAR(512) NULL,
        role VARCHAR(64) NOT NULL,
        created_on VARCHAR(40) NOT NULL,
        last_login VARCHAR(40) NOT NULL,
        bookings TEXT NOT NULL,
        version BIGINT NOT NULL DEFAULT 0,
        CONSTRAINT users_email_uindex UNIQUE (email)
    )",
    "CREATE TABLE IF NOT EXISTS service_providers (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        phone VARCHAR(64) NULL,
        logo VARCHAR(512) NULL,
        created_on VARCHAR(40) NOT NULL,
        last_login VARCHAR(40) NOT NULL,
        seat_classes TEXT NOT NULL,
        flights TEXT NOT NULL,
        version BIGINT NOT NULL DEFAULT 0,
        CONSTRAINT service_providers_email_uindex UNIQUE (email)
    )",
    "CREATE TABLE IF NOT EXISTS seat_classes (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        seat_class_name VARCHAR(255) NOT NULL,
        economy_seats BIGINT NOT NULL,
        economy_seat_price VARCHAR(64) NOT NULL,
        economy_food_price VARCHAR(64) NOT NULL,
        economy_available_seats BIGINT NOT NULL,
        business_seats BIGINT NOT NULL,
        business_seat_price VARCHAR(64) NOT NULL,
        business_food_price VARCHAR(64) NOT NULL,
        business_available_seats BIGINT NOT NULL,
        first_class_seats BIGINT NOT NULL,
        first_class_seat_price VARCHAR(64) NOT NULL,
        first_class_food_price VARCHAR(64) NOT NULL,
        first_class_available_seats BIGINT NOT NULL,
        total_seats BIGINT NOT NULL,
        total_available_seats BIGINT NOT NULL,
        status VARCHAR(64) NOT NULL,
        CONSTRAINT seat_classes_name_uindex UNIQUE (seat_class_name)
    )",
    "CREATE TABLE IF NOT EXISTS flights (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        airline VARCHAR(255) NOT NULL,
        flight_number VARCHAR(64) NOT NULL,
        origin VARCHAR(255) NOT NULL,
        destination VARCHAR(255) NOT NULL,
        departure_time VARCHAR(5) NOT NULL,
        arrival_time VARCHAR(5) NOT NULL,
        image VARCHAR(512) NULL,
        duration VARCHAR(64) NULL,
        seat_class_id VARCHAR(36) NOT NULL,
        luggage_capacity VARCHAR(64) NULL,
        status VARCHAR(64) NOT NULL,
        recurrence VARCHAR(32) NOT NULL,
        CONSTRAINT flights_flight_number_uindex UNIQUE (flight_number)
    )",
    "CREATE TABLE IF NOT EXISTS passengers (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        age BIGINT NOT NULL,
        phone VARCHAR(64) NULL,
        gender VARCHAR(32) NOT NULL,
        seat_class VARCHAR(32) NOT NULL,
        food VARCHAR(8) NOT NULL,
        category VARCHAR(32) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bookings (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        user_id VARCHAR(36) NOT NULL,
        flight_id VARCHAR(36) NOT NULL,
        passenger_ids TEXT NOT NULL,
        total_price VARCHAR(64) NOT NULL,
        booking_date VARCHAR(40) NOT NULL,
        specific_date VARCHAR(10) NOT NULL,
        status VARCHAR(16) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS payments (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        booking_id VARCHAR(36) NOT NULL,
        user_id VARCHAR(36) NOT NULL,
        amount VARCHAR(64) NOT NULL,
        payment_date VARCHAR(40) NOT NULL,
        payment_method VARCHAR(32) NOT NULL,
        status VARCHAR(16) NOT NULL,
        CONSTRAINT payments_booking_id_uindex UNIQUE (booking_id)
    )",
    "CREATE TABLE IF NOT EXISTS approvals (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        service_provider VARCHAR(36) NOT NULL,
        name VARCHAR(32) NOT NULL,
        updating_id VARCHAR(36) NOT NULL,
        status VARCHAR(16) NOT NULL,
        requested_on VARCHAR(40) NOT NULL,
        approved_on VARCHAR(40) NULL
    )",
];

// Database connection manager
#[derive(Clone)]
pub struct Database {
    pub pool: AnyPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(config: &AppConfig) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();

        let pool = PoolOptions::<Any>::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        Ok(Database { pool })
    }

    /// Single-connection in-memory SQLite database. The connection is never
    /// recycled, since dropping it would drop the data.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();

        let pool = PoolOptions::<Any>::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(5))
            .connect("sqlite::memory:")
            .await?;

        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    // Create all tables if they do not exist yet
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for create_sql in SCHEMA {
            sqlx::query(create_sql).execute(&self.pool).await?;
        }
        tracing::debug!(tables = SCHEMA.len(), "schema ready");
        Ok(())
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &AnyPool {
        &self.pool
    }
}
