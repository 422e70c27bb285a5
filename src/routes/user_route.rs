use crate::models::user::{
    LoginRequest, ServiceProviderRegistrationRequest, ServiceProviderResponse,
    UserRegistrationRequest, UserResponse,
};
use crate::services::user_service::UserService;
use crate::utils::error::AppError;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Register a new user
#[openapi(tag = "Users")]
#[post("/users/register", format = "json", data = "<request>")]
pub async fn register_user(
    request: Json<UserRegistrationRequest>,
    user_service: &State<UserService>,
) -> Result<Created<Json<UserResponse>>, AppError> {
    let user = user_service.register_user(request.into_inner()).await?;
    let location = format!("/api/users/{}", user.id);
    Ok(Created::new(location).body(Json(UserResponse { user })))
}

/// Check a user's credentials
#[openapi(tag = "Users")]
#[post("/users/login", format = "json", data = "<request>")]
pub async fn login_user(
    request: Json<LoginRequest>,
    user_service: &State<UserService>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service.login_user(request.into_inner()).await?;
    Ok(Json(UserResponse { user }))
}

#[openapi(tag = "Users")]
#[get("/users/<user_id>")]
pub async fn get_user(
    user_id: &str,
    user_service: &State<UserService>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service.get_user(user_id).await?;
    Ok(Json(UserResponse { user }))
}

#[openapi(tag = "Service Providers")]
#[post("/service-providers/register", format = "json", data = "<request>")]
pub async fn register_service_provider(
    request: Json<ServiceProviderRegistrationRequest>,
    user_service: &State<UserService>,
) -> Result<Created<Json<ServiceProviderResponse>>, AppError> {
    let service_provider = user_service
        .register_service_provider(request.into_inner())
        .await?;
    let location = format!("/api/service-providers/{}", service_provider.id);
    Ok(Created::new(location).body(Json(ServiceProviderResponse { service_provider })))
}

#[openapi(tag = "Service Providers")]
#[post("/service-providers/login", format = "json", data = "<request>")]
pub async fn login_service_provider(
    request: Json<LoginRequest>,
    user_service: &State<UserService>,
) -> Result<Json<ServiceProviderResponse>, AppError> {
    let service_provider = user_service
        .login_service_provider(request.into_inner())
        .await?;
    Ok(Json(ServiceProviderResponse { service_provider }))
}

#[openapi(tag = "Service Providers")]
#[get("/service-providers/<provider_id>")]
pub async fn get_service_provider(
    provider_id: &str,
    user_service: &State<UserService>,
) -> Result<Json<ServiceProviderResponse>, AppError> {
    let service_provider = user_service.get_service_provider(provider_id).await?;
    Ok(Json(ServiceProviderResponse { service_provider }))
}
