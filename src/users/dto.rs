use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Role, User};
use crate::error::{AppError, AppResult};
use crate::validation;

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "dateCreated", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "dateUpdated", with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            title: user.title.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile plus session token, returned by `/authenticate`.
#[derive(Debug, Serialize)]
pub struct AuthenticateResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

impl AuthenticateRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("email", &self.email)?;
        validation::required("password", &self.password)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title)?;
        validation::required("firstName", &self.first_name)?;
        validation::required("lastName", &self.last_name)?;
        validation::email("email", &self.email)?;
        validation::password("password", &self.password)?;
        validation::confirmation("confirmPassword", &self.password, &self.confirm_password)?;
        if !self.accept_terms {
            return Err(AppError::validation(
                "acceptTerms",
                "\"acceptTerms\" must be [true]",
            ));
        }
        Ok(())
    }
}

/// Body of `/verify-email` and `/validate-reset-token`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub token: String,
}

impl TokenRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("token", &self.token)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ForgotPasswordRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::email("email", &self.email)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("token", &self.token)?;
        validation::password("password", &self.password)?;
        validation::confirmation("confirmPassword", &self.password, &self.confirm_password)
    }
}

/// Admin-only account creation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<String>,
}

/// Blank means "not supplied"; anything else must name a role exactly.
fn parse_role(raw: Option<&str>) -> AppResult<Option<Role>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            AppError::validation("role", "\"role\" must be one of [Admin, User]")
        }),
    }
}

impl CreateUserRequest {
    pub fn role(&self) -> AppResult<Role> {
        parse_role(self.role.as_deref())?
            .ok_or_else(|| AppError::validation("role", "\"role\" is required"))
    }

    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title)?;
        validation::required("firstName", &self.first_name)?;
        validation::required("lastName", &self.last_name)?;
        validation::email("email", &self.email)?;
        validation::password("password", &self.password)?;
        validation::confirmation("confirmPassword", &self.password, &self.confirm_password)?;
        self.role().map(|_| ())
    }
}

/// Partial profile update. Blank strings are treated as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    /// Drops blank fields so later checks only see supplied values.
    pub fn normalized(self) -> Self {
        Self {
            title: validation::non_empty(self.title),
            first_name: validation::non_empty(self.first_name),
            last_name: validation::non_empty(self.last_name),
            email: validation::non_empty(self.email),
            password: validation::non_empty(self.password),
            confirm_password: validation::non_empty(self.confirm_password),
            role: validation::non_empty(self.role),
        }
    }

    pub fn role(&self) -> AppResult<Option<Role>> {
        parse_role(self.role.as_deref())
    }

    /// Only admins may change roles.
    pub fn validate(&self, caller_is_admin: bool) -> AppResult<()> {
        if let Some(email) = &self.email {
            validation::email("email", email)?;
        }
        if let Some(password) = &self.password {
            validation::password("password", password)?;
            let confirm = self.confirm_password.as_deref().unwrap_or_default();
            validation::confirmation("confirmPassword", password, confirm)?;
        } else if self.confirm_password.is_some() {
            return Err(AppError::validation(
                "password",
                "\"confirmPassword\" requires \"password\"",
            ));
        }
        if self.role()?.is_some() && !caller_is_admin {
            return Err(AppError::validation("role", "\"role\" is not allowed"));
        }
        Ok(())
    }
}
