//! # 태그 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/tags/ | `list_tags` | 게시글 수가 붙은 태그 목록 (이름순) |
//! | POST | /api/tags/ | `create_tag` | 새 태그 생성 (인증 필요) |
//! | PATCH | /api/tags/{id}/ | `update_tag` | 태그 이름 변경 (인증 필요) |
//! | DELETE | /api/tags/{id}/ | `delete_tag` | 태그 삭제 (인증 필요) |
//!
//! 태그를 삭제하면 게시글과의 연결만 끊기고 게시글은 남습니다.

use crate::{
    db,
    error::AppError,
    middleware::AuthUser,
    models::*,
    routes::posts::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// `GET /api/tags/` → `[{ "id", "name", "slug", "post_count" }]`
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagWithPostCount>>, AppError> {
    let tags = db::list_tags_with_post_count(&state.pool).await?;
    tracing::debug!(
        "tags: {}",
        tags.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );
    Ok(Json(tags))
}

/// `POST /api/tags/` + `{ "name": "..." }` → `201 Created`
///
/// 같은 이름의 태그가 있으면 409입니다.
pub async fn create_tag(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let tag = db::create_tag(&state.pool, &req.name).await?;
    tracing::info!("created tag {}", tag);
    Ok((StatusCode::CREATED, Json(tag)))
}

/// `PATCH /api/tags/{id}/` + `{ "name": "..." }` — slug도 새 이름으로 다시 만듭니다.
pub async fn update_tag(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, AppError> {
    let tag = db::update_tag(&state.pool, id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!("updated tag {}", tag);
    Ok(Json(tag))
}

/// `DELETE /api/tags/{id}/` → `204 No Content`
pub async fn delete_tag(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !db::delete_tag(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(tag_id = id, "deleted tag");
    Ok(StatusCode::NO_CONTENT)
}
