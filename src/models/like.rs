use serde::Deserialize;

/// `POST /api/like/` 요청 본문
#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub post_id: i64,
}

/// 좋아요 등록 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Created,
    AlreadyLiked,
}
