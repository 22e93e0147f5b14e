//! # 블로그 콘텐츠 API 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 기본 카테고리 시드
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod serializers;
mod services;

use anyhow::Result;
use config::Config;
use routes::{build_router, AppState};
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 시스템 환경변수만으로 동작합니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 blogapi, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogapi=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting blog API server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // 요청 처리 중에 만들지 않고 시작 시 한 번만 만듭니다.
    let default_category = db::ensure_default_category(&pool, &config.default_category).await?;
    tracing::info!("Default category: {}", default_category);

    let state = AppState {
        pool,
        jwt_secret: config.jwt_secret.clone(),
        media_url: config.media_url.clone(),
        page_size: config.page_size,
        default_category_id: default_category.id,
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo: X-Forwarded-For가 없는 요청의 클라이언트 IP
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
