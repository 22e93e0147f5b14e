use crate::db;
use crate::error::AppError;
use crate::models::*;
use crate::services::render_html;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// 게시글 목록에 필요한 부가 데이터를 한 번에 불러옵니다.
async fn prefetch_extras(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, PostExtras>, AppError> {
    let mut tags = db::tags_for_posts(pool, post_ids).await?;
    let views = db::view_counts_for_posts(pool, post_ids).await?;
    let likes = db::like_counts_for_posts(pool, post_ids).await?;

    Ok(post_ids
        .iter()
        .map(|id| {
            (
                *id,
                PostExtras {
                    tags: tags.remove(id).unwrap_or_default(),
                    view_counts: views.get(id).copied().unwrap_or(0),
                    likes: likes.get(id).copied().unwrap_or(0),
                },
            )
        })
        .collect())
}

/// 저장된 상대 경로 앞에 `MEDIA_URL`을 붙입니다.
pub fn thumbnail_url(media_url: &str, thumbnail: Option<&str>) -> Option<String> {
    thumbnail
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", media_url, path))
}

fn summarize(
    post: Post,
    extras: PostExtras,
    categories: &CategoryIndex,
    media_url: &str,
) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title,
        tags: extras.tags,
        category: post.category_id.and_then(|id| categories.get(&id).cloned()),
        thumbnail: thumbnail_url(media_url, post.thumbnail.as_deref()),
        view_counts: extras.view_counts,
        likes: extras.likes,
        created_at: post.created_at,
        updated_at: post.updated_at,
        slug: post.slug,
    }
}

/// 게시글 목록을 기본 표현으로 바꿉니다. 순서는 그대로 유지합니다.
pub async fn serialize_summaries(
    pool: &SqlitePool,
    media_url: &str,
    posts: Vec<Post>,
) -> Result<Vec<PostSummary>, AppError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
    let mut extras = prefetch_extras(pool, &ids).await?;
    let categories = db::load_category_index(pool).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let post_extras = extras.remove(&post.id).unwrap_or_default();
            summarize(post, post_extras, &categories, media_url)
        })
        .collect())
}

/// 상세 표현을 만듭니다.
///
/// `is_liked`는 요청자 IP 기준이고, 관련 글은 요청자가 볼 수 있는 것만 담습니다.
pub async fn serialize_detail(
    pool: &SqlitePool,
    media_url: &str,
    post: Post,
    client_ip: &str,
    include_private: bool,
) -> Result<PostDetail, AppError> {
    let related = db::list_related_posts(pool, post.id, include_private).await?;
    let relation_posts = serialize_summaries(pool, media_url, related).await?;
    let is_liked = db::is_liked(pool, post.id, client_ip).await?;
    let text_to_html = render_html(&post.body)?;

    let mut summary = serialize_summaries(pool, media_url, vec![post]).await?;
    let summary = summary
        .pop()
        .ok_or(AppError::Internal("Failed to serialize post".to_string()))?;

    Ok(PostDetail {
        id: summary.id,
        title: summary.title,
        text_to_html,
        tags: summary.tags,
        category: summary.category,
        thumbnail: summary.thumbnail,
        view_counts: summary.view_counts,
        likes: summary.likes,
        is_liked,
        relation_posts,
        created_at: summary.created_at,
        updated_at: summary.updated_at,
        slug: summary.slug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{post_request, seed_post, test_pool};
    use chrono::NaiveDate;

    #[test]
    fn thumbnail_gets_media_prefix() {
        assert_eq!(
            thumbnail_url("/media/", Some("thumbs/a.png")).as_deref(),
            Some("/media/thumbs/a.png")
        );
        assert_eq!(thumbnail_url("/media/", None), None);
        assert_eq!(thumbnail_url("/media/", Some("")), None);
    }

    #[tokio::test]
    async fn summaries_carry_counts_tags_and_category_tree() {
        let pool = test_pool().await;
        let tag = db::create_tag(&pool, "Rust").await.unwrap();
        let mut req = post_request("Counted");
        req.tags = vec![tag.id];
        let post = seed_post(&pool, req).await;
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        db::record_view(&pool, post.id, "1.1.1.1", day).await.unwrap();
        db::create_like(&pool, post.id, "1.1.1.1").await.unwrap();

        let summaries = serialize_summaries(&pool, "/media/", vec![post]).await.unwrap();

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.tags, vec![tag]);
        assert_eq!(summary.view_counts, 1);
        assert_eq!(summary.likes, 1);
        let category = summary.category.as_ref().unwrap();
        assert_eq!(category.category.name, "Programming");
    }

    #[tokio::test]
    async fn detail_renders_markdown_and_hides_private_relations() {
        let pool = test_pool().await;
        let mut hidden = post_request("Hidden");
        hidden.is_public = Some(false);
        let hidden = seed_post(&pool, hidden).await;
        let visible = seed_post(&pool, post_request("Visible")).await;

        let mut req = post_request("Main");
        req.body = "# Hello".to_string();
        req.relation_posts = vec![hidden.id, visible.id];
        let post = seed_post(&pool, req).await;

        let anonymous = serialize_detail(&pool, "/media/", post.clone(), "1.1.1.1", false)
            .await
            .unwrap();
        assert!(anonymous.text_to_html.contains("<h1"));
        assert!(!anonymous.is_liked);
        let ids: Vec<i64> = anonymous.relation_posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![visible.id]);

        db::create_like(&pool, post.id, "1.1.1.1").await.unwrap();
        let editor = serialize_detail(&pool, "/media/", post, "1.1.1.1", true)
            .await
            .unwrap();
        assert!(editor.is_liked);
        assert_eq!(editor.likes, 1);
        assert_eq!(editor.relation_posts.len(), 2);
    }
}
