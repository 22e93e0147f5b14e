//! # 좋아요(Like) 라우트 핸들러
//!
//! `POST /api/like/` + `{ "post_id": 1 }`
//! - 처음 누른 IP → `200 { "message": "You liked this post." }`
//! - 이미 누른 IP → `400 { "message": "You have already liked this post." }`

use crate::{
    db,
    error::AppError,
    middleware::{ClientIp, Viewer},
    models::*,
    routes::posts::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// 좋아요를 등록합니다.
///
/// 요청 본문이 JSON이 아니거나 `post_id`가 정수가 아니면 400입니다.
/// 요청자가 볼 수 없는 게시글은 404입니다.
pub async fn like_post(
    State(state): State<AppState>,
    viewer: Viewer,
    ClientIp(ip): ClientIp,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let post = db::get_post(&state.pool, req.post_id, viewer.is_authenticated())
        .await?
        .ok_or(AppError::NotFound)?;

    match db::create_like(&state.pool, post.id, &ip).await? {
        LikeOutcome::Created => {
            tracing::debug!(post_id = post.id, ip = %ip, "liked post");
            Ok((
                StatusCode::OK,
                Json(json!({ "message": "You liked this post." })),
            ))
        }
        LikeOutcome::AlreadyLiked => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "You have already liked this post." })),
        )),
    }
}
