//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `MEDIA_URL`: 썸네일 경로 앞에 붙는 URL 접두사
//! - `PAGE_SIZE`: 게시글 목록 한 페이지의 글 수
//! - `DEFAULT_CATEGORY`: 시작 시 만들어 두는 기본 카테고리 이름

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/blog.db?mode=rwc")
    pub database_url: String,
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 기본값: "/media/"
    pub media_url: String,
    /// 기본값: 12
    pub page_size: i64,
    /// 기본값: "Programming"
    pub default_category: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
            // 0 이하는 페이지 계산이 불가능하므로 기본값으로 되돌립니다.
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &i64| *size > 0)
                .unwrap_or(12),
            default_category: env::var("DEFAULT_CATEGORY")
                .unwrap_or_else(|_| "Programming".to_string()),
        })
    }
}
