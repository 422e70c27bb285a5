use crate::models::user::{
    LoginRequest, ServiceProvider, ServiceProviderRegistrationRequest, User,
    UserRegistrationRequest,
};
use crate::models::{new_id, timestamp};
use crate::utils::error::{AppError, AppResult};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use sqlx::AnyPool;
use sqlx::AnyConnection;
use validator::Validate;

const USER_COLUMNS: &str =
    "id, name, email, password, phone, image, role, created_on, last_login, bookings, version";
const PROVIDER_COLUMNS: &str = "id, name, email, password, phone, logo, created_on, last_login, seat_classes, flights, version";

/// List fields kept on a service provider record.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ProviderList {
    SeatClasses,
    Flights,
}

impl ProviderList {
    fn column(self) -> &'static str {
        match self {
            ProviderList::SeatClasses => "seat_classes",
            ProviderList::Flights => "flights",
        }
    }
}

pub(crate) async fn fetch_user(conn: &mut AnyConnection, user_id: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

/// Writes a user's booking list, provided nobody changed the record since it
/// was read. A stale version is reported as a write conflict.
pub(crate) async fn store_user_bookings(
    conn: &mut AnyConnection,
    user: &User,
    bookings: &[String],
) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE users SET bookings = ?, version = version + 1 WHERE id = ? AND version = ?",
    )
    .bind(serde_json::to_string(bookings)?)
    .bind(&user.id)
    .bind(user.version)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::WriteConflict(format!(
            "user {} was modified concurrently",
            user.id
        )));
    }
    Ok(())
}

pub(crate) async fn fetch_service_provider(
    conn: &mut AnyConnection,
    provider_id: &str,
) -> AppResult<Option<ServiceProvider>> {
    let provider = sqlx::query_as::<_, ServiceProvider>(&format!(
        "SELECT {} FROM service_providers WHERE id = ?",
        PROVIDER_COLUMNS
    ))
    .bind(provider_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(provider)
}

/// Appends an id to one of the provider's lists (version checked).
pub(crate) async fn append_to_provider(
    conn: &mut AnyConnection,
    provider: &ServiceProvider,
    list: ProviderList,
    id: &str,
) -> AppResult<()> {
    let mut ids = match list {
        ProviderList::SeatClasses => provider.seat_class.clone(),
        ProviderList::Flights => provider.flights.clone(),
    };
    ids.push(id.to_string());

    let result = sqlx::query(&format!(
        "UPDATE service_providers SET {} = ?, version = version + 1 WHERE id = ? AND version = ?",
        list.column()
    ))
    .bind(serde_json::to_string(&ids)?)
    .bind(&provider.id)
    .bind(provider.version)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::WriteConflict(format!(
            "service provider {} was modified concurrently",
            provider.id
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    pool: AnyPool,
    hash_cost: u32,
}

impl UserService {
    pub fn new(pool: AnyPool) -> Self {
        UserService {
            pool,
            hash_cost: DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost (tests use the minimum).
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        hash(password.as_bytes(), self.hash_cost)
            .map_err(|e| AppError::DatabaseError(format!("Password hashing failed: {}", e)))
    }

    // Register a new user
    pub async fn register_user(&self, request: UserRegistrationRequest) -> AppResult<User> {
        request.validate()?;

        // Check if email already exists
        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("User already exists, please check again.".into()));
        }

        let now = Utc::now();
        let user = User {
            id: new_id(),
            name: request.name,
            email: request.email,
            password: self.hash_password(&request.password)?,
            phone: Some(request.phone),
            image: request.image,
            role: request.role,
            created_on: now,
            last_login: now,
            bookings: Vec::new(),
            version: 0,
        };

        sqlx::query(
            r#"INSERT INTO users (id, name, email, password, phone, image, role, created_on, last_login, bookings, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)"#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(&user.image)
        .bind(&user.role)
        .bind(timestamp(user.created_on))
        .bind(timestamp(user.last_login))
        .bind(serde_json::to_string(&user.bookings)?)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    // Login user; credentials only, no session is issued
    pub async fn login_user(&self, request: LoginRequest) -> AppResult<User> {
        let mut user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(&request.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        let password_matches = verify(request.password.as_bytes(), &user.password)
            .map_err(|e| AppError::AuthError(e.to_string()))?;
        if !password_matches {
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        user.last_login = Utc::now();
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(timestamp(user.last_login))
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<User> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".into()))
    }

    pub async fn register_service_provider(
        &self,
        request: ServiceProviderRegistrationRequest,
    ) -> AppResult<ServiceProvider> {
        request.validate()?;

        let existing = sqlx::query("SELECT id FROM service_providers WHERE email = ?")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "Service provider already exists, please check again.".into(),
            ));
        }

        let now = Utc::now();
        let provider = ServiceProvider {
            id: new_id(),
            name: request.name,
            email: request.email,
            password: self.hash_password(&request.password)?,
            phone: Some(request.phone),
            logo: request.logo,
            created_on: now,
            last_login: now,
            seat_class: Vec::new(),
            flights: Vec::new(),
            version: 0,
        };

        sqlx::query(
            r#"INSERT INTO service_providers (id, name, email, password, phone, logo, created_on, last_login, seat_classes, flights, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, '[]', '[]', 0)"#,
        )
        .bind(&provider.id)
        .bind(&provider.name)
        .bind(&provider.email)
        .bind(&provider.password)
        .bind(&provider.phone)
        .bind(&provider.logo)
        .bind(timestamp(provider.created_on))
        .bind(timestamp(provider.last_login))
        .execute(&self.pool)
        .await?;

        tracing::info!(service_provider_id = %provider.id, "service provider registered");
        Ok(provider)
    }

    pub async fn login_service_provider(&self, request: LoginRequest) -> AppResult<ServiceProvider> {
        let provider = sqlx::query_as::<_, ServiceProvider>(&format!(
            "SELECT {} FROM service_providers WHERE email = ?",
            PROVIDER_COLUMNS
        ))
        .bind(&request.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        let password_matches = verify(request.password.as_bytes(), &provider.password)
            .map_err(|e| AppError::AuthError(e.to_string()))?;
        if !password_matches {
            return Err(AppError::AuthError("Invalid credentials".into()));
        }
        Ok(provider)
    }

    pub async fn get_service_provider(&self, provider_id: &str) -> AppResult<ServiceProvider> {
        let mut conn = self.pool.acquire().await?;
        fetch_service_provider(&mut conn, provider_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service provider not found.".into()))
    }
}
