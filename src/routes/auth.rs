//! # 인증 라우트 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | POST | /api/auth/register | 편집자 등록 (첫 계정 이후로는 로그인 필요) |
//! | POST | /api/auth/login | 로그인, 토큰 발급 |
//! | POST | /api/auth/refresh | refresh 토큰 교체 |
//! | POST | /api/auth/logout | 모든 refresh 토큰 폐기 |
//! | GET | /api/auth/me | 내 정보 |
//!
//! access 토큰은 15분, refresh 토큰은 7일짜리 HS256 JWT이며,
//! refresh 토큰은 SHA-256 해시만 DB에 저장합니다.

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{hash_token, issue_token, verify_token, AuthUser, TokenKind, Viewer},
    models::user::*,
    routes::posts::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// access/refresh 토큰 쌍을 만들고 refresh 토큰 해시를 저장합니다.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token_error = |e: jsonwebtoken::errors::Error| {
        AppError::Internal(format!("Token generation failed: {}", e))
    };
    let access_token =
        issue_token(TokenKind::Access, &user.id, &state.jwt_secret).map_err(token_error)?;
    let refresh_token =
        issue_token(TokenKind::Refresh, &user.id, &state.jwt_secret).map_err(token_error)?;

    let pruned = db_users::prune_expired_refresh_tokens(&state.pool, &user.id).await?;
    if pruned > 0 {
        tracing::debug!(user_id = %user.id, pruned, "pruned expired refresh tokens");
    }

    let token_id = uuid::Uuid::now_v7().to_string();
    let expires_at = (Utc::now() + TokenKind::Refresh.lifetime())
        .format(EXPIRES_AT_FORMAT)
        .to_string();
    db_users::store_refresh_token(
        &state.pool,
        &token_id,
        &user.id,
        &hash_token(&refresh_token),
        &expires_at,
    )
    .await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

/// `POST /api/auth/register`
///
/// 사용자가 한 명도 없을 때만 토큰 없이 등록할 수 있습니다.
/// 그 뒤로는 기존 편집자가 로그인한 상태에서 새 계정을 만듭니다.
pub async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if !viewer.is_authenticated() && db_users::count_users(&state.pool).await? > 0 {
        return Err(AppError::Unauthorized(
            "Registration requires an authenticated user".to_string(),
        ));
    }

    if req.username.chars().count() < 3 {
        return Err(AppError::BadRequest("Username must be at least 3 characters".to_string()));
    }
    if req.password.chars().count() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }
    let email = req.email();
    if let Some(email) = email {
        if !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if db_users::find_by_email(&state.pool, email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }

    if db_users::find_by_username(&state.pool, &req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::now_v7().to_string();
    let user =
        db_users::create_user(&state.pool, &user_id, &req.username, email, &password_hash).await?;
    tracing::info!(username = %user.username, "registered editor");

    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = db_users::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or(AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /api/auth/refresh` — 기존 refresh 토큰을 폐기하고 새 쌍을 발급합니다.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_token(&req.refresh_token, &state.jwt_secret, TokenKind::Refresh)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let record = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&record.expires_at, EXPIRES_AT_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_users::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &record.user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    // 동시에 같은 토큰으로 갱신하면 먼저 지운 요청만 새 토큰을 받습니다.
    if !db_users::delete_refresh_token(&state.pool, &token_hash).await? {
        return Err(AppError::Unauthorized("Refresh token not found or revoked".to_string()));
    }

    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}
