//! # 카테고리 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/categories/ | `list_categories` | 게시글 수가 붙은 카테고리 목록 (이름순) |
//! | GET | /api/categories/main/ | `list_main_categories` | main 카테고리와 하위 카테고리 |
//! | GET | /api/categories/main/{id}/ | `get_main_category` | main 카테고리 하나 |
//! | POST | /api/categories/ | `create_category` | 생성 (인증 필요) |
//! | PATCH | /api/categories/{id}/ | `update_category` | 부분 수정 (인증 필요) |
//! | DELETE | /api/categories/{id}/ | `delete_category` | 삭제 (인증 필요) |

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

/// `GET /api/categories/` → `[{ "id", "name", "slug", "post_count" }]`
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryWithPostCount>>, AppError> {
    let categories = db::list_categories_with_post_count(&state.pool).await?;
    tracing::debug!(
        "categories: {}",
        categories.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );
    Ok(Json(categories))
}

/// `GET /api/categories/main/`
pub async fn list_main_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryTree>>, AppError> {
    let categories = db::list_main_categories(&state.pool).await?;
    Ok(Json(categories))
}

/// `GET /api/categories/main/{id}/` — sub 카테고리 ID면 404입니다.
pub async fn get_main_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryTree>, AppError> {
    let category = db::get_main_category(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category))
}

/// `POST /api/categories/` + `{ "name", "category_type", "parent_category"? }` → `201 Created`
pub async fn create_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = db::create_category(&state.pool, &req).await?;
    tracing::info!("created category {}", category);
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PATCH /api/categories/{id}/`
pub async fn update_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = db::update_category(&state.pool, id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!("updated category {}", category);
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}/` → `204 No Content`
///
/// 기본 카테고리는 새 게시글이 들어갈 곳이므로 삭제할 수 없습니다.
pub async fn delete_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if id == state.default_category_id {
        return Err(AppError::BadRequest(
            "The default category cannot be deleted".to_string(),
        ));
    }
    if !db::delete_category(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(category_id = id, "deleted category");
    Ok(StatusCode::NO_CONTENT)
}
