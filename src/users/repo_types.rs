use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    Admin,
    User,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "User" => Ok(Role::User),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verification_token: Option<String>,
    pub is_verified: bool,
    pub reset_token: Option<String>,
    pub reset_token_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

/// Values for a user row that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    /// `None` lets the store pick: Admin when no user exists yet, User
    /// otherwise. The check and the insert happen as one step.
    pub role: Option<Role>,
    pub verification_token: Option<String>,
    pub is_verified: bool,
}

/// Whitelisted profile fields a caller may change. `None` keeps the current
/// value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl User {
    /// Returns the record with `changes` applied and `updated_at` stamped.
    pub fn with_changes(self, changes: UserChanges, now: OffsetDateTime) -> User {
        User {
            title: changes.title.unwrap_or(self.title),
            first_name: changes.first_name.unwrap_or(self.first_name),
            last_name: changes.last_name.unwrap_or(self.last_name),
            email: changes.email.unwrap_or(self.email),
            password_hash: changes.password_hash.unwrap_or(self.password_hash),
            role: changes.role.unwrap_or(self.role),
            updated_at: Some(now),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: Uuid::new_v4(),
            title: "Ms".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: Role::User,
            verification_token: Some("vt".into()),
            is_verified: false,
            reset_token: Some("rt".into()),
            reset_token_expires: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn with_changes_only_touches_whitelisted_fields() {
        let user = sample();
        let now = OffsetDateTime::now_utc();
        let changed = user.clone().with_changes(
            UserChanges {
                first_name: Some("Augusta".into()),
                role: Some(Role::Admin),
                ..Default::default()
            },
            now,
        );
        assert_eq!(changed.first_name, "Augusta");
        assert_eq!(changed.role, Role::Admin);
        assert_eq!(changed.last_name, user.last_name);
        assert_eq!(changed.email, user.email);
        assert_eq!(changed.password_hash, user.password_hash);
        assert_eq!(changed.verification_token, user.verification_token);
        assert_eq!(changed.reset_token, user.reset_token);
        assert_eq!(changed.is_verified, user.is_verified);
        assert_eq!(changed.updated_at, Some(now));
    }

    #[test]
    fn role_serializes_as_variant_name() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert_eq!(serde_json::from_str::<Role>("\"User\"").unwrap(), Role::User);
    }

    #[test]
    fn role_parses_exact_variant_names() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("User".parse::<Role>(), Ok(Role::User));
        assert!("admin".parse::<Role>().is_err());
        assert!("Superuser".parse::<Role>().is_err());
    }
}
