//! # 편집자(User) 모델
//!
//! 공개 API는 익명으로도 쓸 수 있고, 계정은 비공개 글 열람과
//! 게시글·태그·카테고리 편집에만 필요합니다.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// UUIDv7 문자열
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    /// argon2 PHC 문자열. 응답에 절대 포함하지 않습니다.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 저장된 refresh 토큰 한 건. 토큰 원문과 해시는 담지 않습니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: String,
    pub user_id: String,
    /// `EXPIRES_AT_FORMAT` 형식의 UTC 시각
    pub expires_at: String,
}

/// 응답용 사용자 표현 (비밀번호 해시 제외)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// `POST /api/auth/register`
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

impl RegisterRequest {
    /// 빈 문자열 이메일은 "없음"으로 취급합니다.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// `POST /api/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/auth/refresh`
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}
