//! # 조회 기록(Counter) 쿼리
//!
//! 상세 조회 요청마다 `(ip_address, access_date, post_id)` 한 행을 쌓고,
//! 조회수는 `(ip_address, access_date)` 조합의 DISTINCT 개수로 계산합니다.
//! 즉 "같은 IP가 같은 날 여러 번 본 것"은 한 번으로 셉니다.

use crate::error::AppError;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

/// 조회 기록을 한 행 추가합니다.
pub async fn record_view(
    pool: &SqlitePool,
    post_id: i64,
    ip_address: &str,
    access_date: NaiveDate,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO counters (ip_address, access_date, post_id) VALUES (?, ?, ?)")
        .bind(ip_address)
        .bind(access_date.format("%Y-%m-%d").to_string())
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 여러 게시글의 조회수를 한 번에 계산합니다. 기록이 없는 게시글은 키가 없습니다.
pub async fn view_counts_for_posts(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, i64>, AppError> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT post_id, COUNT(*) FROM \
         (SELECT DISTINCT post_id, ip_address, access_date FROM counters WHERE post_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in post_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")) GROUP BY post_id");

    let rows: Vec<(i64, i64)> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().collect())
}
