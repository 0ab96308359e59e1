use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials for the bootstrap admin account created at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    /// Fixed offset used when formatting stored UTC timestamps for display,
    /// e.g. "+05:30".
    pub display_offset: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "parkwise".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "parkwise-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let admin = AdminConfig {
            name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into()),
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@parking.com".into()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into()),
        };
        let display_offset =
            std::env::var("DISPLAY_UTC_OFFSET").unwrap_or_else(|_| "+05:30".into());
        Ok(Self {
            database_url,
            jwt,
            admin,
            display_offset,
        })
    }
}
