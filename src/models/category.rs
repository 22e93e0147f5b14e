//! # 카테고리 모델 정의
//!
//! 카테고리는 `main` / `sub` 두 단계 트리입니다.
//! `sub` 카테고리는 반드시 `main` 카테고리를 부모로 가집니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 카테고리 단계. DB에는 소문자 문자열(`main`, `sub`)로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CategoryType {
    Main,
    Sub,
}

/// 카테고리 엔티티 — DB의 `categories` 테이블 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: CategoryType,
    /// 부모 카테고리 ID. API에서는 `parent_category`라는 이름으로 노출합니다.
    #[serde(rename = "parent_category")]
    pub parent_id: Option<i64>,
    pub slug: String,
}

/// 하위 카테고리를 한 단계 중첩한 표현. 게시글의 `category` 필드와
/// `GET /api/categories/main/` 응답에 쓰입니다.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Category>,
}

/// 게시글 수가 붙은 카테고리 — `GET /api/categories/` 응답 항목
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryWithPostCount {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub category_type: CategoryType,
    pub parent_category: Option<i64>,
}

/// 카테고리 수정 요청
///
/// `parent_category`는 세 가지 상태를 구분합니다:
/// None = 필드 누락 (변경 안 함), Some(None) = null (부모 해제), Some(Some(id)) = 부모 지정
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub category_type: Option<CategoryType>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub parent_category: Option<Option<i64>>,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.name)
    }
}

impl fmt::Display for CategoryWithPostCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.post_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_serializes_flat_fields_and_children() {
        let tree = CategoryTree {
            category: Category {
                id: 1,
                name: "Programming".to_string(),
                category_type: CategoryType::Main,
                parent_id: None,
                slug: "programming".to_string(),
            },
            subcategories: vec![Category {
                id: 2,
                name: "Rust".to_string(),
                category_type: CategoryType::Sub,
                parent_id: Some(1),
                slug: "rust".to_string(),
            }],
        };

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["name"], "Programming");
        assert_eq!(value["category_type"], "main");
        assert!(value["parent_category"].is_null());
        assert_eq!(value["subcategories"][0]["parent_category"], 1);
        assert_eq!(value["subcategories"][0]["category_type"], "sub");
    }

    #[test]
    fn update_request_distinguishes_null_from_missing() {
        let missing: UpdateCategoryRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(missing.parent_category, None);

        let cleared: UpdateCategoryRequest =
            serde_json::from_str(r#"{"parent_category":null}"#).unwrap();
        assert_eq!(cleared.parent_category, Some(None));

        let set: UpdateCategoryRequest = serde_json::from_str(r#"{"parent_category":4}"#).unwrap();
        assert_eq!(set.parent_category, Some(Some(4)));
    }
}
