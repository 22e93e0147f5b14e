//! # 태그 데이터베이스 쿼리 모듈
//!
//! 태그 CRUD 및 게시글-태그 관계를 관리하는 SQL 쿼리 함수들입니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, name, slug)
//! - `post_tags`: 게시글과 태그의 다대다(N:M) 관계 테이블

use crate::error::AppError;
use crate::models::*;
use crate::services::slugify;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

/// 모든 태그를 이름순으로, 연결된 게시글 수와 함께 조회합니다.
///
/// 게시글 수는 공개 여부와 관계없이 모든 게시글을 셉니다.
pub async fn list_tags_with_post_count(pool: &SqlitePool) -> Result<Vec<TagWithPostCount>, AppError> {
    let tags = sqlx::query_as::<_, TagWithPostCount>(
        r#"
        SELECT t.id, t.name, t.slug, COUNT(pt.post_id) AS post_count
        FROM tags t
        LEFT JOIN post_tags pt ON pt.tag_id = t.id
        GROUP BY t.id
        ORDER BY t.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// ID로 태그 하나를 조회합니다.
pub async fn get_tag(pool: &SqlitePool, id: i64) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

/// 새 태그를 생성합니다. slug는 이름에서 파생됩니다.
///
/// 이름이나 slug가 이미 있으면 `Conflict`를 반환합니다.
pub async fn create_tag(pool: &SqlitePool, name: &str) -> Result<Tag, AppError> {
    let name = validate_tag_name(name)?;

    let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
        .bind(name)
        .bind(slugify(name))
        .execute(pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Tag already exists"))?;

    get_tag(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created tag".to_string()))
}

/// 태그 이름을 바꿉니다. slug도 함께 다시 계산합니다.
///
/// ## 반환값
/// - `Ok(Some(Tag))`: 수정된 태그
/// - `Ok(None)`: 해당 ID의 태그가 없음
pub async fn update_tag(
    pool: &SqlitePool,
    id: i64,
    req: &UpdateTagRequest,
) -> Result<Option<Tag>, AppError> {
    if get_tag(pool, id).await?.is_none() {
        return Ok(None);
    }

    if let Some(name) = &req.name {
        let name = validate_tag_name(name)?;
        sqlx::query("UPDATE tags SET name = ?, slug = ? WHERE id = ?")
            .bind(name)
            .bind(slugify(name))
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Tag already exists"))?;
    }

    get_tag(pool, id).await
}

/// ID로 태그를 삭제합니다.
///
/// `post_tags`의 `ON DELETE CASCADE`로 게시글과의 연결만 끊기고
/// 게시글 자체는 남습니다.
pub async fn delete_tag(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 여러 게시글의 태그를 한 번의 쿼리로 불러옵니다 (prefetch).
///
/// 반환값은 게시글 ID → 이름순 태그 목록입니다. 태그가 없는 게시글은 키가 없습니다.
pub async fn tags_for_posts(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<Tag>>, AppError> {
    let mut by_post: HashMap<i64, Vec<Tag>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(by_post);
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT pt.post_id, t.id, t.name, t.slug \
         FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
         WHERE pt.post_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in post_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY t.name");

    let rows: Vec<(i64, i64, String, String)> = qb.build_query_as().fetch_all(pool).await?;
    for (post_id, id, name, slug) in rows {
        by_post.entry(post_id).or_default().push(Tag { id, name, slug });
    }

    Ok(by_post)
}

/// 게시글의 태그 집합을 `tag_ids`로 교체합니다. 트랜잭션 안에서 호출합니다.
pub(crate) async fn replace_post_tags(
    conn: &mut SqliteConnection,
    post_id: i64,
    tag_ids: &[i64],
) -> Result<(), AppError> {
    super::ensure_ids_exist(&mut *conn, "tags", tag_ids, "tag").await?;

    sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    for tag_id in tag_ids {
        // 같은 태그가 두 번 들어와도 복합 PK 덕분에 한 행만 남습니다.
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

fn validate_tag_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Tag name cannot be empty".to_string()));
    }
    if name.chars().count() > 255 {
        return Err(AppError::BadRequest("Tag name is too long".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn create_derives_unicode_slug() {
        let pool = test_pool().await;
        let tag = create_tag(&pool, "Rust 入門").await.unwrap();
        assert_eq!(tag.slug, "rust-入門");
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let pool = test_pool().await;
        create_tag(&pool, "Rust").await.unwrap();
        let err = create_tag(&pool, "Rust").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn rename_updates_slug() {
        let pool = test_pool().await;
        let tag = create_tag(&pool, "Rust").await.unwrap();
        let updated = update_tag(
            &pool,
            tag.id,
            &UpdateTagRequest {
                name: Some("Async Rust".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.slug, "async-rust");

        let missing = update_tag(&pool, 999, &UpdateTagRequest { name: None })
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_is_name_ordered_with_counts() {
        let pool = test_pool().await;
        create_tag(&pool, "web").await.unwrap();
        create_tag(&pool, "api").await.unwrap();

        let tags = list_tags_with_post_count(&pool).await.unwrap();
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
        assert!(tags.iter().all(|t| t.post_count == 0));
    }
}
