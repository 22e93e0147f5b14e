//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 직렬화 계층(serializers/)에서 호출합니다.
//!
//! 각 하위 모듈:
//! - `categories`: 카테고리 CRUD, 기본 카테고리 시드, 트리 조립
//! - `counters`: 조회 기록 저장과 (ip, 날짜) 기준 조회수 집계
//! - `likes`: 좋아요 등록과 집계
//! - `posts`: 게시글 조회(필터·페이지), 검색, 편집
//! - `tags`: 태그 CRUD와 게시글-태그 관계
//! - `users`: 사용자 인증 관련 쿼리

pub mod categories;
pub mod counters;
pub mod likes;
pub mod posts;
pub mod tags;
pub mod users;

pub use categories::*;
pub use counters::*;
pub use likes::*;
pub use posts::*;
pub use tags::*;

use crate::error::AppError;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// `table`에 `ids`가 모두 존재하는지 확인합니다. 없는 ID가 있으면 400을 반환합니다.
///
/// `table`은 코드에 고정된 테이블 이름만 넘깁니다 (사용자 입력 금지).
pub(crate) async fn ensure_ids_exist(
    conn: &mut SqliteConnection,
    table: &'static str,
    ids: &[i64],
    what: &str,
) -> Result<(), AppError> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {} WHERE id IN (", table));
    let mut separated = qb.separated(", ");
    for id in &unique {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let (found,): (i64,) = qb.build_query_as().fetch_one(&mut *conn).await?;
    if found as usize != unique.len() {
        return Err(AppError::BadRequest(format!("Unknown {} id", what)));
    }
    Ok(())
}

/// `LIKE` 패턴의 와일드카드(`%`, `_`)와 이스케이프 문자를 무력화합니다.
/// 쿼리에는 `ESCAPE '\'`를 함께 써야 합니다.
///
/// 대소문자 무시는 SQLite `LIKE` 규칙을 따르므로 ASCII 문자에만 적용됩니다.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// 테스트용 인메모리 DB. 실제 마이그레이션을 적용합니다.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        // 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정합니다.
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// 테스트용 게시글 생성 요청. 기본값은 공개, 태그·관련 글 없음입니다.
#[cfg(test)]
pub(crate) fn post_request(title: &str) -> crate::models::CreatePostRequest {
    crate::models::CreatePostRequest {
        title: title.to_string(),
        body: String::new(),
        thumbnail: None,
        category: None,
        tags: vec![],
        relation_posts: vec![],
        is_public: None,
        description: String::new(),
        keywords: String::new(),
    }
}

/// 기본 카테고리를 시드한 뒤 게시글을 만듭니다.
#[cfg(test)]
pub(crate) async fn seed_post(
    pool: &sqlx::SqlitePool,
    req: crate::models::CreatePostRequest,
) -> crate::models::Post {
    let default = ensure_default_category(pool, "Programming").await.unwrap();
    create_post(pool, &req, default.id).await.unwrap()
}
