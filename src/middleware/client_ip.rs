//! # 클라이언트 IP 추출자
//!
//! 좋아요와 조회수 중복 제거의 기준이 되는 IP를 구합니다.
//! 프록시를 거친 요청은 `X-Forwarded-For`의 첫 번째 값을,
//! 그렇지 않으면 TCP 연결의 상대 주소를 씁니다.
//!
//! 헤더는 클라이언트가 임의로 넣을 수 있으므로 신원 증명으로 쓰면 안 됩니다.

use crate::error::AppError;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = forwarded_for(&parts.headers) {
            return Ok(ClientIp(ip));
        }

        // main에서 into_make_service_with_connect_info로 서빙해야 채워집니다.
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientIp(addr.ip().to_string()))
            .ok_or(AppError::BadRequest(
                "Unable to determine client address".to_string(),
            ))
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
