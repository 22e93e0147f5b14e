//! # 게시글 데이터베이스 쿼리 모듈
//!
//! 목록 조회는 `PostFilter`를 WHERE 절로 바꿔 실행합니다:
//! - 비공개 글은 `include_private`일 때만 포함
//! - 검색어마다 `(title LIKE ? OR description LIKE ? OR body LIKE ?)`를 AND로 연결
//! - 태그마다 `EXISTS (post_tags ...)`를 AND로 연결 (같은 태그 반복은 결과에 영향 없음)
//! - 카테고리는 ID 일치
//!
//! 정렬은 항상 `updated_at DESC, id DESC` (최근 수정순)입니다.
//!
//! 편집(생성/수정)은 게시글 행, 태그 집합, 관련 글 집합을 한 트랜잭션에서 씁니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::slugify;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const POST_COLUMNS: &str = "p.id, p.title, p.body, p.thumbnail, p.category_id, p.is_public, \
                            p.description, p.keywords, p.slug, p.created_at, p.updated_at";

const TITLE_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 130;

/// 필터 조건을 `WHERE` 절로 붙입니다. 조건이 없어도 `WHERE 1 = 1`로 시작합니다.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PostFilter) {
    qb.push(" WHERE 1 = 1");

    if !filter.include_private {
        qb.push(" AND p.is_public = 1");
    }

    // SQLite LIKE는 ASCII 문자만 대소문자를 무시합니다.
    // 악센트 문자나 전각 문자 등은 대소문자가 다르면 일치하지 않습니다.
    for keyword in &filter.keywords {
        let pattern = super::like_pattern(keyword);
        qb.push(" AND (p.title LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.description LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.body LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }

    for tag_id in &filter.tag_ids {
        qb.push(" AND EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ");
        qb.push_bind(*tag_id);
        qb.push(")");
    }

    if let Some(category_id) = filter.category_id {
        qb.push(" AND p.category_id = ");
        qb.push_bind(category_id);
    }
}

/// 필터에 맞는 게시글 수
pub async fn count_posts(pool: &SqlitePool, filter: &PostFilter) -> Result<i64, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
    push_filter(&mut qb, filter);

    let (count,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
    Ok(count)
}

/// 필터에 맞는 게시글을 최근 수정순으로 `limit`개 가져옵니다.
pub async fn list_posts(
    pool: &SqlitePool,
    filter: &PostFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM posts p", POST_COLUMNS));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY p.updated_at DESC, p.id DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let posts = qb.build_query_as::<Post>().fetch_all(pool).await?;
    Ok(posts)
}

/// ID로 게시글을 조회합니다. `include_private`가 false면 공개 글만 찾습니다.
pub async fn get_post(
    pool: &SqlitePool,
    id: i64,
    include_private: bool,
) -> Result<Option<Post>, AppError> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "SELECT {} FROM posts p WHERE p.id = ? AND (p.is_public = 1 OR ?)",
        POST_COLUMNS
    ))
    .bind(id)
    .bind(include_private)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// 게시글의 관련 글 목록 (ID순). 가시성 규칙은 목록과 같습니다.
pub async fn list_related_posts(
    pool: &SqlitePool,
    post_id: i64,
    include_private: bool,
) -> Result<Vec<Post>, AppError> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {}
        FROM post_relations pr
        JOIN posts p ON p.id = pr.related_post_id
        WHERE pr.post_id = ? AND (p.is_public = 1 OR ?)
        ORDER BY p.id
        "#,
        POST_COLUMNS
    ))
    .bind(post_id)
    .bind(include_private)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// 제목에 `keyword`가 포함된 게시글의 (pk, 제목) 목록.
/// 편집 화면의 관련 글 추천에 쓰이며, 빈 검색어는 빈 목록입니다.
pub async fn suggest_posts_by_title(
    pool: &SqlitePool,
    keyword: &str,
) -> Result<Vec<PostSuggestion>, AppError> {
    if keyword.is_empty() {
        return Ok(Vec::new());
    }

    let suggestions = sqlx::query_as::<_, PostSuggestion>(
        "SELECT id AS pk, title AS name FROM posts WHERE title LIKE ? ESCAPE '\\' ORDER BY id",
    )
    .bind(super::like_pattern(keyword))
    .fetch_all(pool)
    .await?;

    Ok(suggestions)
}

/// 게시글을 생성합니다. 카테고리를 지정하지 않으면 `default_category_id`를 씁니다.
pub async fn create_post(
    pool: &SqlitePool,
    req: &CreatePostRequest,
    default_category_id: i64,
) -> Result<Post, AppError> {
    let title = validate_title(&req.title)?;
    validate_description(&req.description)?;
    let category_id = req.category.unwrap_or(default_category_id);

    let mut tx = pool.begin().await?;
    super::ensure_ids_exist(&mut *tx, "categories", &[category_id], "category").await?;

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, body, thumbnail, category_id, is_public, description, keywords, slug)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(title)
    .bind(&req.body)
    .bind(&req.thumbnail)
    .bind(category_id)
    .bind(req.is_public.unwrap_or(true))
    .bind(&req.description)
    .bind(&req.keywords)
    .bind(slugify(title))
    .execute(&mut *tx)
    .await?;
    let id = result.last_insert_rowid();

    super::replace_post_tags(&mut *tx, id, &req.tags).await?;
    replace_relations(&mut *tx, id, &req.relation_posts).await?;
    tx.commit().await?;

    get_post(pool, id, true)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created post".to_string()))
}

/// 게시글을 부분 수정합니다. 수정하면 `updated_at`이 갱신됩니다.
///
/// ## 반환값
/// - `Ok(Some(Post))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 게시글이 없음
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    req: &UpdatePostRequest,
) -> Result<Option<Post>, AppError> {
    let Some(current) = get_post(pool, id, true).await? else {
        return Ok(None);
    };

    let title = match &req.title {
        Some(title) => validate_title(title)?.to_string(),
        None => current.title,
    };
    let description = match &req.description {
        Some(description) => {
            validate_description(description)?;
            description.clone()
        }
        None => current.description,
    };
    let thumbnail = match &req.thumbnail {
        Some(thumbnail) => thumbnail.clone(),
        None => current.thumbnail,
    };
    let category_id = req.category.unwrap_or(current.category_id);

    let mut tx = pool.begin().await?;
    if let Some(category_id) = category_id {
        super::ensure_ids_exist(&mut *tx, "categories", &[category_id], "category").await?;
    }

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, body = ?, thumbnail = ?, category_id = ?, is_public = ?,
            description = ?, keywords = ?, slug = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&title)
    .bind(req.body.as_ref().unwrap_or(&current.body))
    .bind(thumbnail)
    .bind(category_id)
    .bind(req.is_public.unwrap_or(current.is_public))
    .bind(description)
    .bind(req.keywords.as_ref().unwrap_or(&current.keywords))
    .bind(slugify(&title))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(tags) = &req.tags {
        super::replace_post_tags(&mut *tx, id, tags).await?;
    }
    if let Some(relations) = &req.relation_posts {
        replace_relations(&mut *tx, id, relations).await?;
    }
    tx.commit().await?;

    get_post(pool, id, true).await
}

/// 게시글을 삭제합니다. 조회 기록, 좋아요, 태그/관련 글 연결도 함께 삭제됩니다.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 관련 글 집합을 교체합니다. 관계는 양방향 두 행으로 저장합니다.
async fn replace_relations(
    conn: &mut SqliteConnection,
    post_id: i64,
    related_ids: &[i64],
) -> Result<(), AppError> {
    if related_ids.contains(&post_id) {
        return Err(AppError::BadRequest(
            "A post cannot be related to itself".to_string(),
        ));
    }
    super::ensure_ids_exist(&mut *conn, "posts", related_ids, "related post").await?;

    sqlx::query("DELETE FROM post_relations WHERE post_id = ? OR related_post_id = ?")
        .bind(post_id)
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    for related_id in related_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO post_relations (post_id, related_post_id) VALUES (?, ?), (?, ?)",
        )
        .bind(post_id)
        .bind(related_id)
        .bind(related_id)
        .bind(post_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn validate_title(title: &str) -> Result<&str, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    Ok(title)
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(AppError::BadRequest(format!(
            "Description must be at most {} characters",
            DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(())
}
