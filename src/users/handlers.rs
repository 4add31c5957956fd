use axum::{
    extract::{Path, State},
    http::{header::ORIGIN, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info, instrument};

use super::dto::{
    AuthenticateRequest, AuthenticateResponse, CreateUserRequest, ForgotPasswordRequest,
    MessageResponse, RegisterRequest, ResetPasswordRequest, TokenRequest, UpdateUserRequest,
    UserResponse,
};
use super::services;
use crate::{
    auth::extractors::{AdminCaller, Caller},
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/authenticate", post(authenticate))
        .route("/register", post(register))
        .route("/verify-email", post(verify_email))
        .route("/forgot-password", post(forgot_password))
        .route("/validate-reset-token", post(validate_reset_token))
        .route("/reset-password", post(reset_password))
        .route("/", get(get_all).post(create))
        .route("/:id", get(get_by_id).put(update).delete(delete_user))
}

/// Base URL for links in outgoing email: the configured front end, else the
/// request's `Origin` header.
fn link_origin<'a>(state: &'a AppState, headers: &'a HeaderMap) -> Option<&'a str> {
    state
        .config
        .mail
        .app_origin
        .as_deref()
        .or_else(|| headers.get(ORIGIN).and_then(|v| v.to_str().ok()))
}

#[instrument(skip(state, payload))]
pub async fn authenticate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AuthenticateRequest>,
) -> AppResult<Json<AuthenticateResponse>> {
    payload.validate()?;
    services::authenticate(&state, payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::BadRequest("Email or password is incorrect".into()))
}

#[instrument(skip(state, headers, payload))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;
    services::register(&state, payload, link_origin(&state, &headers)).await?;
    Ok(Json(MessageResponse::new(
        "Registration successful, please check your email for verification instructions",
    )))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;
    services::verify_email(&state, &payload.token).await?;
    Ok(Json(MessageResponse::new(
        "Verification successful, you can now login",
    )))
}

#[instrument(skip(state, headers, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;
    services::forgot_password(&state, payload, link_origin(&state, &headers)).await?;
    Ok(Json(MessageResponse::new(
        "Please check your email for password reset instructions",
    )))
}

#[instrument(skip(state, payload))]
pub async fn validate_reset_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;
    services::validate_reset_token(&state, &payload.token).await?;
    Ok(Json(MessageResponse::new("Token is valid")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;
    services::reset_password(&state, payload).await?;
    Ok(Json(MessageResponse::new(
        "Password reset successful, you can now login",
    )))
}

#[instrument(skip(state))]
pub async fn get_all(
    State(state): State<AppState>,
    admin: AdminCaller,
) -> AppResult<Json<Vec<UserResponse>>> {
    debug!(admin = %admin.0.id, "listing users");
    Ok(Json(services::get_all(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    caller.ensure_access(&id)?;
    Ok(Json(services::get_by_id(&state, &id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    admin: AdminCaller,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;
    info!(admin = %admin.0.id, "admin creating user");
    Ok(Json(services::create(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    caller.ensure_access(&id)?;
    let payload = payload.normalized();
    payload.validate(caller.is_admin())?;
    Ok(Json(services::update(&state, &id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    caller.ensure_access(&id)?;
    services::delete(&state, &id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
