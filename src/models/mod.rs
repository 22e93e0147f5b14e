//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `category`: 카테고리와 2단계 트리 표현
//! - `like`: 좋아요 요청/결과
//! - `post`: 게시글 엔티티와 API 표현
//! - `tag`: 태그
//! - `user`: 사용자(User)와 인증 요청/응답
//!
//! `pub use X::*;`로 하위 모듈 항목을 재공개하여
//! `crate::models::Post`처럼 짧게 접근할 수 있게 합니다.

pub mod category;
pub mod like;
pub mod post;
pub mod tag;
pub mod user;

pub use category::*;
pub use like::*;
pub use post::*;
pub use tag::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// PATCH 요청에서 "필드 누락"과 "명시적 null"을 구분하기 위한 역직렬화 함수.
///
/// `#[serde(default, deserialize_with = "double_option")]`와 함께 쓰면
/// 누락 → `None`, `null` → `Some(None)`, 값 → `Some(Some(v))`가 됩니다.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
