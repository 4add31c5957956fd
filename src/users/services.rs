use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{
    AuthenticateRequest, AuthenticateResponse, CreateUserRequest, ForgotPasswordRequest,
    RegisterRequest, ResetPasswordRequest, UpdateUserRequest, UserResponse,
};
use super::emails;
use super::repo_types::{NewUser, User, UserChanges};
use crate::auth::{jwt::JwtKeys, password, tokens};
use crate::error::{AppError, AppResult, StoreError};
use crate::mail::Email;
use crate::state::AppState;
use crate::validation::normalize_email;

const USER_NOT_FOUND: &str = "User not found";

/// Malformed ids are reported the same way as unknown ones.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(USER_NOT_FOUND.into()))
}

async fn get_user(state: &AppState, raw_id: &str) -> AppResult<User> {
    let id = parse_id(raw_id)?;
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.into()))
}

/// Returns the profile and a session token for a verified user whose
/// password matches, `None` for any other combination.
pub async fn authenticate(
    state: &AppState,
    req: AuthenticateRequest,
) -> AppResult<Option<AuthenticateResponse>> {
    let email = normalize_email(&req.email);
    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "authenticate unknown email");
        return Ok(None);
    };

    if !user.is_verified {
        warn!(user_id = %user.id, "authenticate unverified account");
        return Ok(None);
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "authenticate invalid password");
        return Ok(None);
    }

    let token = JwtKeys::from_ref(state).sign(user.id, user.role)?;
    info!(user_id = %user.id, "user authenticated");
    Ok(Some(AuthenticateResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

/// Sends after the record is written. A failed send fails the request but
/// leaves the saved user or reset token in place.
async fn deliver(state: &AppState, email: Email) -> AppResult<()> {
    let to = email.to.clone();
    state.mailer.send(email).await.map_err(|e| {
        warn!(to = %to, error = %e, "email delivery failed after record was saved");
        AppError::Internal(e)
    })
}

enum Registration {
    Created(User),
    AlreadyRegistered(String),
}

async fn register_account(state: &AppState, req: RegisterRequest) -> AppResult<Registration> {
    let email = normalize_email(&req.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Ok(Registration::AlreadyRegistered(email));
    }

    let new_user = NewUser {
        title: req.title,
        first_name: req.first_name,
        last_name: req.last_name,
        email,
        password_hash: password::hash_password(&req.password)?,
        role: None,
        verification_token: Some(tokens::generate_token()),
        is_verified: false,
    };

    match state.users.insert(new_user).await {
        Ok(user) => Ok(Registration::Created(user)),
        // Lost a race with a concurrent registration of the same address.
        Err(StoreError::EmailTaken(email)) => Ok(Registration::AlreadyRegistered(email)),
        Err(e) => Err(e.into()),
    }
}

/// Registers a new account. An address that is already on file gets a
/// notice by email and the caller sees the same success as a new signup.
pub async fn register(
    state: &AppState,
    req: RegisterRequest,
    origin: Option<&str>,
) -> AppResult<()> {
    let email = match register_account(state, req).await? {
        Registration::Created(user) => {
            info!(user_id = %user.id, role = ?user.role, "user registered");
            let token = user.verification_token.as_deref().unwrap_or_default();
            emails::verification(&user.email, token, origin)
        }
        Registration::AlreadyRegistered(email) => {
            warn!(email = %email, "registration for existing email");
            emails::already_registered(&email, origin)
        }
    };
    deliver(state, email).await
}

pub async fn verify_email(state: &AppState, token: &str) -> AppResult<()> {
    let user = state
        .users
        .find_by_verification_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("Verification failed".into()))?;

    let user = User {
        is_verified: true,
        verification_token: None,
        updated_at: Some(OffsetDateTime::now_utc()),
        ..user
    };
    state.users.save(&user).await?;
    info!(user_id = %user.id, "email verified");
    Ok(())
}

/// Issues a fresh reset token. Unknown addresses are ignored silently.
pub async fn forgot_password(
    state: &AppState,
    req: ForgotPasswordRequest,
    origin: Option<&str>,
) -> AppResult<()> {
    let email = normalize_email(&req.email);
    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "forgot-password for unknown email");
        return Ok(());
    };

    let now = OffsetDateTime::now_utc();
    let user = User {
        reset_token: Some(tokens::generate_token()),
        reset_token_expires: Some(tokens::reset_token_expiry(
            now,
            state.config.reset_token_ttl_hours,
        )),
        ..user
    };
    let user = state.users.save(&user).await?;
    info!(user_id = %user.id, "password reset token issued");

    let token = user.reset_token.as_deref().unwrap_or_default();
    deliver(state, emails::password_reset(&user.email, token, origin)).await
}

async fn find_by_live_reset_token(state: &AppState, token: &str) -> AppResult<User> {
    let user = state.users.find_by_reset_token(token).await?;
    match user {
        Some(user) if tokens::is_unexpired(user.reset_token_expires, OffsetDateTime::now_utc()) => {
            Ok(user)
        }
        _ => {
            warn!("invalid or expired reset token");
            Err(AppError::BadRequest("Invalid token".into()))
        }
    }
}

pub async fn validate_reset_token(state: &AppState, token: &str) -> AppResult<()> {
    find_by_live_reset_token(state, token).await.map(|_| ())
}

/// Sets a new password and consumes the reset token. Completing a reset
/// also proves ownership of the address, so the account becomes verified.
pub async fn reset_password(state: &AppState, req: ResetPasswordRequest) -> AppResult<()> {
    let user = find_by_live_reset_token(state, &req.token).await?;
    let user = User {
        password_hash: password::hash_password(&req.password)?,
        is_verified: true,
        reset_token: None,
        reset_token_expires: None,
        updated_at: Some(OffsetDateTime::now_utc()),
        ..user
    };
    state.users.save(&user).await?;
    info!(user_id = %user.id, "password reset");
    Ok(())
}

pub async fn get_all(state: &AppState) -> AppResult<Vec<UserResponse>> {
    let users = state.users.list().await?;
    Ok(users.iter().map(UserResponse::from).collect())
}

pub async fn get_by_id(state: &AppState, raw_id: &str) -> AppResult<UserResponse> {
    let user = get_user(state, raw_id).await?;
    Ok(UserResponse::from(&user))
}

/// Admin account creation; the new account is verified immediately.
pub async fn create(state: &AppState, req: CreateUserRequest) -> AppResult<UserResponse> {
    let role = req.role()?;
    let email = normalize_email(&req.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Email \"{email}\" is already registered"
        )));
    }

    let user = state
        .users
        .insert(NewUser {
            title: req.title,
            first_name: req.first_name,
            last_name: req.last_name,
            email,
            password_hash: password::hash_password(&req.password)?,
            role: Some(role),
            verification_token: None,
            is_verified: true,
        })
        .await?;
    info!(user_id = %user.id, role = ?user.role, "user created");
    Ok(UserResponse::from(&user))
}

/// `req` must already be validated and normalized.
pub async fn update(
    state: &AppState,
    raw_id: &str,
    req: UpdateUserRequest,
) -> AppResult<UserResponse> {
    let user = get_user(state, raw_id).await?;

    let email = req.email.as_deref().map(normalize_email);
    if let Some(email) = email.as_deref() {
        if email != user.email && state.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email \"{email}\" is already taken"
            )));
        }
    }

    let password_hash = match req.password.as_deref() {
        Some(plain) => Some(password::hash_password(plain)?),
        None => None,
    };

    let role = req.role()?;
    let changes = UserChanges {
        title: req.title,
        first_name: req.first_name,
        last_name: req.last_name,
        email,
        password_hash,
        role,
    };
    let user = state
        .users
        .save(&user.with_changes(changes, OffsetDateTime::now_utc()))
        .await?;
    info!(user_id = %user.id, "user updated");
    Ok(UserResponse::from(&user))
}

pub async fn delete(state: &AppState, raw_id: &str) -> AppResult<()> {
    let user = get_user(state, raw_id).await?;
    if !state.users.delete(user.id).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.into()));
    }
    info!(user_id = %user.id, "user deleted");
    Ok(())
}
