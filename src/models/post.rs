//! # 게시글 모델 정의
//!
//! - `Post`: DB의 `posts` 테이블 한 행
//! - `PostSummary`: 목록·관련 글에 쓰는 기본 표현 (본문 없음)
//! - `PostDetail`: 상세 API의 전체 표현 (HTML 본문, 관련 글, 좋아요 여부)
//! - `PostPage`: 목록 API의 페이지 응답
//! - `PostFilter`: 목록 조회 조건

use super::{CategoryTree, Tag};
use serde::{Deserialize, Serialize};

/// 게시글 엔티티. 좋아요 수와 조회수는 저장하지 않고 매 요청마다 계산합니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// 마크다운 원문
    pub body: String,
    /// 미디어 루트 기준 상대 경로
    pub thumbnail: Option<String>,
    pub category_id: Option<i64>,
    pub is_public: bool,
    /// SEO meta description
    pub description: String,
    /// SEO meta keywords
    pub keywords: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 기본 게시글 표현
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub tags: Vec<Tag>,
    pub category: Option<CategoryTree>,
    pub thumbnail: Option<String>,
    pub view_counts: i64,
    pub likes: i64,
    pub created_at: String,
    pub updated_at: String,
    pub slug: String,
}

/// 전체 게시글 표현
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub text_to_html: String,
    pub tags: Vec<Tag>,
    pub category: Option<CategoryTree>,
    pub thumbnail: Option<String>,
    pub view_counts: i64,
    pub likes: i64,
    pub is_liked: bool,
    pub relation_posts: Vec<PostSummary>,
    pub created_at: String,
    pub updated_at: String,
    pub slug: String,
}

/// `GET /api/posts/` 응답
#[derive(Debug, Serialize)]
pub struct PostPage {
    pub count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub post_list: Vec<PostSummary>,
}

/// 목록 조회 조건. 비어 있는 조건은 아무것도 걸러내지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// 공백으로 나뉜 검색어. 모든 검색어가 제목/설명/본문 중 하나에 포함되어야 합니다.
    pub keywords: Vec<String>,
    /// 모든 태그를 가진 게시글만 남깁니다.
    pub tag_ids: Vec<i64>,
    pub category_id: Option<i64>,
    /// 비공개 글 포함 여부 (인증된 사용자만 true)
    pub include_private: bool,
}

/// `GET /api/posts/simple_search` 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PostSuggestion {
    pub pk: i64,
    pub name: String,
}

/// 게시글 생성 요청 — `POST /api/posts/`
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub thumbnail: Option<String>,
    /// 없으면 기본 카테고리가 지정됩니다.
    pub category: Option<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub relation_posts: Vec<i64>,
    pub is_public: Option<bool>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
}

/// 게시글 수정 요청 — `PATCH /api/posts/{id}/`
///
/// `tags`, `relation_posts`는 보내면 전체 집합을 교체합니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub thumbnail: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub category: Option<Option<i64>>,
    pub tags: Option<Vec<i64>>,
    pub relation_posts: Option<Vec<i64>>,
    pub is_public: Option<bool>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// 게시글 하나에 딸린 미리 불러온 데이터 묶음.
/// 직렬화 계층이 `Post` 행과 합쳐 응답을 만듭니다.
#[derive(Debug, Clone, Default)]
pub struct PostExtras {
    pub tags: Vec<Tag>,
    pub view_counts: i64,
    pub likes: i64,
}

/// 카테고리 트리 조립에 쓰는 전체 카테고리 목록
pub type CategoryIndex = std::collections::HashMap<i64, CategoryTree>;
