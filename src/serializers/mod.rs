//! # 응답 직렬화 계층
//!
//! DB 행(`Post`)을 API 응답 모양(`PostSummary`, `PostDetail`)으로 바꿉니다.
//! 태그, 카테고리 트리, 조회수, 좋아요 수는 게시글마다 따로 묻지 않고
//! 목록 전체에 대해 한 번씩 미리 불러옵니다.

pub mod post;

pub use post::*;
