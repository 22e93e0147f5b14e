//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/health` → `{ "status": "ok", "database": "ok" }`
//!
//! 로드밸런서나 컨테이너 헬스체크용입니다. DB에 `SELECT 1`을 보내
//! 연결 풀이 살아 있는지도 함께 확인합니다.

use crate::{error::AppError, routes::posts::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /api/health`
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "database": "ok"
    })))
}
