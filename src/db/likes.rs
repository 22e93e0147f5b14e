//! # 좋아요(Like) 쿼리
//!
//! `likes` 테이블에는 `UNIQUE (post_id, ip_address)` 제약이 있습니다.
//! 등록은 `INSERT ... ON CONFLICT DO NOTHING` 한 번으로 끝나고,
//! 좋아요 수는 저장하지 않고 항상 `COUNT(*)`로 계산합니다.
//! 그래서 동시에 같은 IP의 요청이 들어와도 수가 어긋나지 않습니다.

use crate::error::AppError;
use crate::models::LikeOutcome;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

/// 좋아요를 등록합니다. 이미 같은 IP의 좋아요가 있으면 `AlreadyLiked`입니다.
pub async fn create_like(
    pool: &SqlitePool,
    post_id: i64,
    ip_address: &str,
) -> Result<LikeOutcome, AppError> {
    let result = sqlx::query(
        "INSERT INTO likes (ip_address, post_id) VALUES (?, ?) \
         ON CONFLICT (post_id, ip_address) DO NOTHING",
    )
    .bind(ip_address)
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(if result.rows_affected() == 1 {
        LikeOutcome::Created
    } else {
        LikeOutcome::AlreadyLiked
    })
}

/// 해당 IP가 이 게시글에 좋아요를 눌렀는지 확인합니다.
pub async fn is_liked(pool: &SqlitePool, post_id: i64, ip_address: &str) -> Result<bool, AppError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM likes WHERE post_id = ? AND ip_address = ?)",
    )
    .bind(post_id)
    .bind(ip_address)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// 여러 게시글의 좋아요 수를 한 번에 계산합니다. 0건인 게시글은 키가 없습니다.
pub async fn like_counts_for_posts(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, i64>, AppError> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT post_id, COUNT(*) FROM likes WHERE post_id IN (");
    let mut separated = qb.separated(", ");
    for id in post_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") GROUP BY post_id");

    let rows: Vec<(i64, i64)> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().collect())
}
