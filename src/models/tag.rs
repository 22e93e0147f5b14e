//! # 태그 모델 정의
//!
//! 게시글을 분류하는 태그(Tag)의 데이터 구조체들입니다.
//!
//! ## 구조체 역할
//! - `Tag`: DB의 `tags` 테이블 한 행. 게시글 응답 안에 그대로 포함됩니다.
//! - `TagWithPostCount`: 태그 목록 API 응답용 (연결된 게시글 수 포함)
//! - `CreateTagRequest` / `UpdateTagRequest`: 편집용 요청 본문

use serde::{Deserialize, Serialize};
use std::fmt;

/// 태그 엔티티 — DB의 `tags` 테이블 한 행(row)에 대응합니다.
///
/// `slug`는 이름에서 파생되며, 저장할 때마다 다시 계산됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 게시글 수가 붙은 태그 — `GET /api/tags/` 응답 항목입니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TagWithPostCount {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
}

/// 태그 생성 요청 — `POST /api/tags/`
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// 태그 수정 요청 — `PATCH /api/tags/{id}/`
#[derive(Debug, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
}

/// 사람이 읽는 라벨. 검색 폼이나 태그 클라우드에서 쓰입니다.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.name)
    }
}

/// 게시글 수가 있으면 `이름(개수)` 형식으로 표시합니다.
impl fmt::Display for TagWithPostCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.post_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_uses_post_count_when_present() {
        let tag = TagWithPostCount {
            id: 3,
            name: "Rust".to_string(),
            slug: "rust".to_string(),
            post_count: 7,
        };
        assert_eq!(tag.to_string(), "Rust(7)");
    }

    #[test]
    fn label_falls_back_to_id_and_name() {
        let tag = Tag {
            id: 3,
            name: "Rust".to_string(),
            slug: "rust".to_string(),
        };
        assert_eq!(tag.to_string(), "3:Rust");
    }
}
