//! # 요청 추출자(Extractor) 모듈
//!
//! - `auth`: JWT 인증 (`AuthUser`, `Viewer`)
//! - `client_ip`: 요청자 IP (`ClientIp`)

pub mod auth;
pub mod client_ip;

pub use auth::{AuthUser, Viewer};
pub use client_ip::ClientIp;
