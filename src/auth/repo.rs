use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserProfile, ROLE_CLIENT, STATUS_ACTIVE};
use crate::auth::CreateUserError;

const PROFILE_COLUMNS: &str =
    "id, email, name, company, credits, role, status, created_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create credentials and a zero-credit client profile in one transaction.
    pub async fn create_with_profile(db: &PgPool, new: &NewUser) -> Result<UserProfile, CreateUserError> {
        let mut tx = db.begin().await.context("begin tx")?;

        let user_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => CreateUserError::EmailTaken,
            other => CreateUserError::Store(anyhow::Error::new(other).context("insert user")),
        })?;

        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO user_profiles (id, email, name, company, credits, role, status)
            VALUES ($1, $2, $3, $4, 0, $5, $6)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.company)
        .bind(ROLE_CLIENT)
        .bind(STATUS_ACTIVE)
        .fetch_one(&mut *tx)
        .await
        .context("insert profile")?;

        tx.commit().await.context("commit tx")?;
        Ok(profile)
    }
}

pub async fn get_profile(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get profile")?;
    Ok(profile)
}

/// All profiles, newest first.
pub async fn list_profiles(db: &PgPool) -> anyhow::Result<Vec<UserProfile>> {
    let rows = sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM user_profiles ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
    .context("list profiles")?;
    Ok(rows)
}

// ---- Sessions ----

pub async fn create_session(db: &PgPool, user_id: Uuid) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO sessions (user_id)
        VALUES ($1)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("insert session")?;
    Ok(id)
}

pub async fn session_active(db: &PgPool, session_id: Uuid) -> anyhow::Result<bool> {
    let live: Option<bool> = sqlx::query_scalar(
        r#"
        SELECT revoked_at IS NULL
          FROM sessions
         WHERE id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(db)
    .await
    .context("lookup session")?;
    Ok(live.unwrap_or(false))
}

pub async fn revoke_session(db: &PgPool, session_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE sessions
           SET revoked_at = now()
         WHERE id = $1 AND revoked_at IS NULL
        "#,
    )
    .bind(session_id)
    .execute(db)
    .await
    .context("revoke session")?;
    Ok(())
}
