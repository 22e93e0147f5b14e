//! # 인증 추출자와 JWT 유틸리티
//!
//! - `AuthUser`: 유효한 access 토큰이 반드시 있어야 하는 편집 핸들러용
//! - `Viewer`: 공개 API용. 토큰이 없으면 익명, 있으면 검증합니다.
//!   잘못되었거나 만료된 토큰은 익명으로 넘기지 않고 401입니다.
//!
//! 토큰은 HS256 JWT이고 `kind` 클레임으로 access/refresh를 구분합니다.
//! refresh 토큰을 Bearer 헤더에 넣어도 인증되지 않습니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::routes::posts::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// access 15분, refresh 7일
    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(15),
            TokenKind::Refresh => Duration::days(7),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 사용자 ID
    pub sub: String,
    /// 토큰마다 고유한 ID. 같은 초에 발급한 토큰도 해시가 겹치지 않습니다.
    pub jti: String,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

/// 인증된 편집자
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// `Authorization` 헤더의 Bearer 토큰. 헤더가 없으면 `None`입니다.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| Some(token.trim()))
        .ok_or(AuthError::InvalidToken)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(AuthError::MissingToken)?;
        let claims = verify_token(token, &state.jwt_secret, TokenKind::Access)?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

/// 공개 API의 요청자
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthUser>);

impl Viewer {
    /// 인증된 사용자는 비공개 게시글도 볼 수 있습니다.
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(Viewer(None));
        };
        let claims = verify_token(token, &state.jwt_secret, TokenKind::Access)?;

        Ok(Viewer(Some(AuthUser {
            user_id: claims.sub,
        })))
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingToken => ("missing_token", "Authorization token is required"),
            AuthError::InvalidToken => ("invalid_token", "Invalid authorization token"),
            AuthError::ExpiredToken => ("expired_token", "Authorization token has expired"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// `kind` 토큰을 발급합니다. 만료 시각은 `TokenKind::lifetime` 기준입니다.
pub fn issue_token(
    kind: TokenKind,
    user_id: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        jti: uuid::Uuid::now_v7().to_string(),
        kind,
        iat: now.timestamp(),
        exp: (now + kind.lifetime()).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 서명, 만료, 토큰 종류를 검사합니다.
pub fn verify_token(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?
    .claims;

    if claims.kind != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// refresh 토큰은 원문 대신 SHA-256 hex로 저장합니다.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips_subject() {
        let token = issue_token(TokenKind::Access, "user-1", "secret").unwrap();
        let claims = verify_token(&token, "secret", TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token(TokenKind::Access, "user-1", "secret").unwrap();
        assert!(matches!(
            verify_token(&token, "other", TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let token = issue_token(TokenKind::Refresh, "user-1", "secret").unwrap();
        assert!(matches!(
            verify_token(&token, "secret", TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
        assert!(verify_token(&token, "secret", TokenKind::Refresh).is_ok());
    }

    #[test]
    fn tokens_issued_together_differ() {
        let first = issue_token(TokenKind::Refresh, "user-1", "secret").unwrap();
        let second = issue_token(TokenKind::Refresh, "user-1", "secret").unwrap();
        assert_ne!(hash_token(&first), hash_token(&second));
    }

    #[test]
    fn bearer_prefix_is_required() {
        let (parts, _) = axum::http::Request::builder()
            .header(AUTHORIZATION, "Token abc")
            .body(())
            .unwrap()
            .into_parts();
        assert!(matches!(bearer_token(&parts), Err(AuthError::InvalidToken)));

        let (parts, _) = axum::http::Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(bearer_token(&parts), Ok(None)));
    }

    #[test]
    fn token_hash_is_stable_hex() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_eq!(hash_token("abc").len(), 64);
    }
}
