//! # 서비스 모듈
//!
//! DB와 HTTP에 의존하지 않는 순수 로직을 모아둔 모듈입니다.
//! - `markdown`: 게시글 본문 렌더링
//! - `pagination`: 페이지 번호 계산
//! - `slug`: 유니코드 slug 생성

pub mod markdown;
pub mod pagination;
pub mod slug;

pub use markdown::render_html;
pub use pagination::Page;
pub use slug::slugify;
