use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::services::hash_password;
use crate::config::AppConfig;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: Option<String>,
    pub pin_code: Option<String>,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, pin_code, is_admin, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, pin_code, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new member account with a hashed password.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        address: Option<&str>,
        pin_code: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, address, pin_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, address, pin_code, is_admin, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(address)
        .bind(pin_code)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Create the admin account if it does not exist yet; safe to call on
    /// every boot.
    pub async fn ensure_admin(db: &PgPool, config: &AppConfig) -> anyhow::Result<User> {
        if let Some(existing) = Self::find_by_email(db, &config.admin.email).await? {
            return Ok(existing);
        }
        let hash = hash_password(&config.admin.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, address, pin_code, is_admin)
            VALUES ($1, $2, $3, 'Admin Office', '000000', TRUE)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, name, email, password_hash, address, pin_code, is_admin, created_at
            "#,
        )
        .bind(&config.admin.name)
        .bind(&config.admin.email)
        .bind(&hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// All non-admin accounts, newest first.
    pub async fn list_members(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, pin_code, is_admin, created_at
            FROM users
            WHERE NOT is_admin
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Text search over non-admin accounts: name, email, address, pin code.
    pub async fn search_members(db: &PgPool, query: &str) -> anyhow::Result<Vec<User>> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, pin_code, is_admin, created_at
            FROM users
            WHERE NOT is_admin
              AND (name ILIKE $1 OR email ILIKE $1 OR address ILIKE $1 OR pin_code ILIKE $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
