//! # 편집자 계정·refresh 토큰 쿼리
//!
//! refresh 토큰은 원문 대신 해시만 저장하고, 갱신할 때마다 한 건씩 교체합니다.
//! 시각은 모두 `strftime('%Y-%m-%dT%H:%M:%fZ')`와 같은 형식의 문자열이라
//! 문자열 비교로 만료 여부를 판단할 수 있습니다.

use crate::error::AppError;
use crate::models::user::{RefreshTokenRecord, User};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

/// 계정을 만듭니다. 사용자 이름이나 이메일이 겹치면 409입니다.
pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<User, AppError> {
    sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Username or email already exists"))?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

/// 등록된 사용자 수. 첫 계정은 토큰 없이 등록할 수 있는지 판단할 때 씁니다.
pub async fn count_users(pool: &SqlitePool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// `column`은 코드에 고정된 UNIQUE 컬럼 이름만 넘깁니다.
async fn find_user_by(
    pool: &SqlitePool,
    column: &'static str,
    value: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE {} = ?",
        USER_COLUMNS, column
    ))
    .bind(value)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    find_user_by(pool, "id", id).await
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    find_user_by(pool, "username", username).await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    find_user_by(pool, "email", email).await
}

pub async fn store_refresh_token(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<RefreshTokenRecord>, AppError> {
    let record = sqlx::query_as::<_, RefreshTokenRecord>(
        "SELECT id, user_id, expires_at FROM refresh_tokens WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// 토큰 한 건을 폐기합니다. 이미 없던 토큰이면 false입니다.
pub async fn delete_refresh_token(pool: &SqlitePool, token_hash: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 로그아웃: 사용자의 모든 refresh 토큰을 폐기합니다.
pub async fn delete_user_refresh_tokens(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 사용자의 만료된 refresh 토큰을 지웁니다. 새 토큰을 발급할 때마다 호출합니다.
pub async fn prune_expired_refresh_tokens(pool: &SqlitePool, user_id: &str) -> Result<u64, AppError> {
    let result = sqlx::query(
        "DELETE FROM refresh_tokens \
         WHERE user_id = ? AND expires_at < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
