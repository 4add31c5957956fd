use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub from: String,
    /// Front-end base URL for links in emails. When unset, the request's
    /// `Origin` header is used.
    pub app_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    /// Lifetime of a password reset token.
    pub reset_token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "signup-api".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "signup-api-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7),
        };
        let mail = MailConfig {
            from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@signup-api.local".into()),
            app_origin: std::env::var("APP_ORIGIN")
                .ok()
                .map(|o| o.trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty()),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            mail,
            reset_token_ttl_hours: env_parse("RESET_TOKEN_TTL_HOURS").unwrap_or(24),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
