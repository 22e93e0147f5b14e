//! # 게시글(Post) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/posts/`                 → 게시글 목록 (검색·필터·페이지)
//! - `GET    /api/posts/{id}/{slug}/`     → 게시글 상세, 조회 기록 추가
//! - `GET    /api/posts/simple_search`    → 제목 검색 (관련 글 추천용)
//! - `POST   /api/posts/`                 → 게시글 생성 (인증 필요)
//! - `PATCH  /api/posts/{id}/`            → 게시글 부분 수정 (인증 필요)
//! - `DELETE /api/posts/{id}/`            → 게시글 삭제 (인증 필요)
//!
//! 공개 엔드포인트는 `Viewer`로 요청자를 구분합니다.
//! 익명 요청자는 공개 글만, 인증된 요청자는 비공개 글까지 봅니다.

use crate::{
    db,
    error::AppError,
    middleware::{AuthUser, ClientIp, Viewer},
    models::*,
    serializers,
    services::Page,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`은 내부적으로 Arc라서 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 썸네일 경로 앞에 붙는 접두사
    pub media_url: String,
    /// 목록 한 페이지의 게시글 수
    pub page_size: i64,
    /// 카테고리 없이 만든 게시글이 들어갈 카테고리
    pub default_category_id: i64,
}

/// `GET /api/posts/`의 쿼리 파라미터
///
/// `tag`는 여러 번 올 수 있으므로 `(이름, 값)` 쌍 목록에서 직접 읽습니다.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListParams {
    pub keywords: Vec<String>,
    pub tag_ids: Vec<i64>,
    pub category_id: Option<i64>,
    pub page: i64,
}

impl ListParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, AppError> {
        let mut params = ListParams {
            page: 1,
            ..Default::default()
        };

        for (name, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.as_str() {
                "keyword" => params
                    .keywords
                    .extend(value.split_whitespace().map(str::to_string)),
                "tag" => params.tag_ids.push(parse_int("tag", value)?),
                "category" => params.category_id = Some(parse_int("category", value)?),
                "page" => params.page = parse_int("page", value)?,
                _ => {}
            }
        }

        Ok(params)
    }
}

fn parse_int(name: &str, value: &str) -> Result<i64, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("'{}' must be an integer", name)))
}

/// `GET /api/posts/` — 게시글 목록을 최근 수정순으로 조회합니다.
///
/// `?keyword=django api&tag=1&tag=2&category=3&page=2`
/// - `keyword`: 공백으로 나눈 모든 검색어가 제목/설명/본문 중 하나에 있어야 함
/// - `tag`: 주어진 태그를 모두 가진 글
/// - `category`: 카테고리 ID 일치
pub async fn list_posts(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PostPage>, AppError> {
    let params = ListParams::from_pairs(&pairs)?;
    let filter = PostFilter {
        keywords: params.keywords,
        tag_ids: params.tag_ids,
        category_id: params.category_id,
        include_private: viewer.is_authenticated(),
    };

    let count = db::count_posts(&state.pool, &filter).await?;
    let page = Page::resolve(params.page, state.page_size, count)?;
    let posts = db::list_posts(&state.pool, &filter, page.size, page.offset()).await?;
    let post_list = serializers::serialize_summaries(&state.pool, &state.media_url, posts).await?;

    Ok(Json(PostPage {
        count,
        total_pages: page.total_pages,
        current_page: page.number,
        post_list,
    }))
}

/// `GET /api/posts/{id}/{slug}/` — 게시글 상세
///
/// 게시글은 ID로만 찾고 slug는 URL 장식입니다.
/// 찾으면 응답을 만들기 전에 조회 기록을 한 행 추가합니다.
pub async fn get_post_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    ClientIp(ip): ClientIp,
    Path((id, _slug)): Path<(String, String)>,
) -> Result<Json<PostDetail>, AppError> {
    let id: i64 = id.parse().map_err(|_| AppError::NotFound)?;
    let include_private = viewer.is_authenticated();

    let post = db::get_post(&state.pool, id, include_private)
        .await?
        .ok_or(AppError::NotFound)?;

    db::record_view(&state.pool, post.id, &ip, Utc::now().date_naive()).await?;
    tracing::debug!(post_id = post.id, ip = %ip, "recorded view");

    let detail =
        serializers::serialize_detail(&state.pool, &state.media_url, post, &ip, include_private)
            .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct SimpleSearchParams {
    pub keyword: Option<String>,
}

/// `GET /api/posts/simple_search?keyword=` → `{ "object_list": [{ "pk", "name" }] }`
pub async fn simple_search(
    State(state): State<AppState>,
    Query(params): Query<SimpleSearchParams>,
) -> Result<Json<Value>, AppError> {
    let keyword = params.keyword.unwrap_or_default();
    let object_list = db::suggest_posts_by_title(&state.pool, &keyword).await?;
    Ok(Json(json!({ "object_list": object_list })))
}

/// `POST /api/posts/` → `201 Created`
pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostSummary>), AppError> {
    let post = db::create_post(&state.pool, &req, state.default_category_id).await?;
    tracing::info!(post_id = post.id, user = %auth_user.user_id, "created post {:?}", post.title);

    Ok((StatusCode::CREATED, Json(summarize(&state, post).await?)))
}

/// `PATCH /api/posts/{id}/` — 보낸 필드만 바꾸고 `updated_at`을 갱신합니다.
pub async fn update_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostSummary>, AppError> {
    let post = db::update_post(&state.pool, id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(post_id = post.id, user = %auth_user.user_id, "updated post");

    Ok(Json(summarize(&state, post).await?))
}

/// `DELETE /api/posts/{id}/` → `204 No Content`
///
/// 조회 기록, 좋아요, 태그·관련 글 연결도 함께 삭제됩니다.
pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !db::delete_post(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(post_id = id, user = %auth_user.user_id, "deleted post");
    Ok(StatusCode::NO_CONTENT)
}

async fn summarize(state: &AppState, post: Post) -> Result<PostSummary, AppError> {
    serializers::serialize_summaries(&state.pool, &state.media_url, vec![post])
        .await?
        .pop()
        .ok_or(AppError::Internal("Failed to serialize post".to_string()))
}
