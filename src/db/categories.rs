//! # 카테고리 데이터베이스 쿼리 모듈
//!
//! 카테고리는 `main` → `sub` 두 단계까지만 허용합니다.
//! 스키마의 CHECK 제약은 "main은 부모 없음 / sub는 부모 있음"만 보장하므로,
//! "sub의 부모는 main이어야 한다"는 규칙은 여기서 검사합니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::slugify;
use sqlx::SqlitePool;
use std::collections::HashMap;

const CATEGORY_COLUMNS: &str = "id, name, category_type, parent_id, slug";

/// 기본 카테고리를 만들어 두고 반환합니다. 서버 시작 시 한 번 호출합니다.
///
/// 같은 이름의 카테고리가 이미 있으면 그대로 사용합니다.
pub async fn ensure_default_category(pool: &SqlitePool, name: &str) -> Result<Category, AppError> {
    sqlx::query(
        "INSERT INTO categories (name, category_type, slug) VALUES (?, 'main', ?) \
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(name)
    .bind(slugify(name))
    .execute(pool)
    .await?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE name = ?",
        CATEGORY_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::Internal("Failed to seed default category".to_string()))?;

    Ok(category)
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> Result<Option<Category>, AppError> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE id = ?",
        CATEGORY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

/// 모든 카테고리를 이름순으로 조회합니다.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories ORDER BY name",
        CATEGORY_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// 모든 카테고리를 이름순으로, 직접 연결된 게시글 수와 함께 조회합니다.
pub async fn list_categories_with_post_count(
    pool: &SqlitePool,
) -> Result<Vec<CategoryWithPostCount>, AppError> {
    let categories = sqlx::query_as::<_, CategoryWithPostCount>(
        r#"
        SELECT c.id, c.name, c.slug, COUNT(p.id) AS post_count
        FROM categories c
        LEFT JOIN posts p ON p.category_id = c.id
        GROUP BY c.id
        ORDER BY c.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// 전체 카테고리를 ID → 트리(하위 카테고리 한 단계 포함)로 묶습니다.
///
/// 카테고리 수는 적으므로 한 번에 모두 읽어 메모리에서 조립합니다.
/// 게시글 직렬화 시 카테고리 prefetch로도 사용합니다.
pub async fn load_category_index(pool: &SqlitePool) -> Result<CategoryIndex, AppError> {
    let categories = list_categories(pool).await?;

    let mut children: HashMap<i64, Vec<Category>> = HashMap::new();
    for category in &categories {
        if let Some(parent_id) = category.parent_id {
            children.entry(parent_id).or_default().push(category.clone());
        }
    }

    Ok(categories
        .into_iter()
        .map(|category| {
            let subcategories = children.remove(&category.id).unwrap_or_default();
            (
                category.id,
                CategoryTree {
                    category,
                    subcategories,
                },
            )
        })
        .collect())
}

/// main 카테고리 목록(하위 카테고리 포함)을 이름순으로 반환합니다.
pub async fn list_main_categories(pool: &SqlitePool) -> Result<Vec<CategoryTree>, AppError> {
    let index = load_category_index(pool).await?;
    let mut mains: Vec<CategoryTree> = index
        .into_values()
        .filter(|tree| tree.category.category_type == CategoryType::Main)
        .collect();
    mains.sort_by(|a, b| a.category.name.cmp(&b.category.name));
    Ok(mains)
}

/// main 카테고리 하나를 하위 카테고리와 함께 반환합니다. sub 카테고리면 None입니다.
pub async fn get_main_category(pool: &SqlitePool, id: i64) -> Result<Option<CategoryTree>, AppError> {
    let mut index = load_category_index(pool).await?;
    Ok(index
        .remove(&id)
        .filter(|tree| tree.category.category_type == CategoryType::Main))
}

pub async fn create_category(
    pool: &SqlitePool,
    req: &CreateCategoryRequest,
) -> Result<Category, AppError> {
    let name = validate_category_name(&req.name)?;
    validate_tree(pool, None, req.category_type, req.parent_category).await?;

    let result = sqlx::query(
        "INSERT INTO categories (name, category_type, parent_id, slug) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(req.category_type)
    .bind(req.parent_category)
    .bind(slugify(name))
    .execute(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Category already exists"))?;

    get_category(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created category".to_string()))
}

/// 카테고리를 부분 수정합니다. 수정 후의 (단계, 부모) 조합이 트리 규칙을 만족해야 합니다.
pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    req: &UpdateCategoryRequest,
) -> Result<Option<Category>, AppError> {
    let Some(current) = get_category(pool, id).await? else {
        return Ok(None);
    };

    let name = match &req.name {
        Some(name) => validate_category_name(name)?.to_string(),
        None => current.name.clone(),
    };
    let category_type = req.category_type.unwrap_or(current.category_type);
    let parent_id = match req.parent_category {
        Some(parent) => parent,
        // main으로 바꾸면서 부모를 명시하지 않았으면 부모를 해제합니다.
        None if category_type == CategoryType::Main => None,
        None => current.parent_id,
    };

    validate_tree(pool, Some(id), category_type, parent_id).await?;

    sqlx::query(
        "UPDATE categories SET name = ?, category_type = ?, parent_id = ?, slug = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(category_type)
    .bind(parent_id)
    .bind(slugify(&name))
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Category already exists"))?;

    get_category(pool, id).await
}

/// 카테고리를 삭제합니다.
///
/// 하위 카테고리는 함께 삭제되고(CASCADE), 게시글은 카테고리 없음(NULL)이 됩니다.
pub async fn delete_category(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 2단계 트리 규칙 검사
///
/// - main: 부모가 없어야 함
/// - sub: 부모가 있어야 하고, 부모는 자기 자신이 아닌 main이어야 함
/// - 하위 카테고리를 가진 카테고리는 sub가 될 수 없음 (3단계 방지)
async fn validate_tree(
    pool: &SqlitePool,
    id: Option<i64>,
    category_type: CategoryType,
    parent_id: Option<i64>,
) -> Result<(), AppError> {
    match (category_type, parent_id) {
        (CategoryType::Main, Some(_)) => Err(AppError::BadRequest(
            "A main category cannot have a parent category".to_string(),
        )),
        (CategoryType::Main, None) => Ok(()),
        (CategoryType::Sub, None) => Err(AppError::BadRequest(
            "A sub category requires a parent category".to_string(),
        )),
        (CategoryType::Sub, Some(parent_id)) => {
            if Some(parent_id) == id {
                return Err(AppError::BadRequest(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            let parent = get_category(pool, parent_id)
                .await?
                .ok_or(AppError::BadRequest("Parent category not found".to_string()))?;
            if parent.category_type != CategoryType::Main {
                return Err(AppError::BadRequest(
                    "The parent of a sub category must be a main category".to_string(),
                ));
            }

            if let Some(id) = id {
                let (children,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM categories WHERE parent_id = ?")
                        .bind(id)
                        .fetch_one(pool)
                        .await?;
                if children > 0 {
                    return Err(AppError::BadRequest(
                        "A category with subcategories must stay a main category".to_string(),
                    ));
                }
            }
            Ok(())
        }
    }
}

fn validate_category_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name cannot be empty".to_string()));
    }
    if name.chars().count() > 100 {
        return Err(AppError::BadRequest("Category name is too long".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn main_req(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            category_type: CategoryType::Main,
            parent_category: None,
        }
    }

    fn sub_req(name: &str, parent: i64) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            category_type: CategoryType::Sub,
            parent_category: Some(parent),
        }
    }

    #[tokio::test]
    async fn default_category_seed_is_idempotent() {
        let pool = test_pool().await;
        let first = ensure_default_category(&pool, "Programming").await.unwrap();
        let second = ensure_default_category(&pool, "Programming").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.category_type, CategoryType::Main);
        assert_eq!(list_categories(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn main_category_nests_its_subcategories() {
        let pool = test_pool().await;
        let main = create_category(&pool, &main_req("Programming")).await.unwrap();
        create_category(&pool, &sub_req("Rust", main.id)).await.unwrap();
        create_category(&pool, &sub_req("Go", main.id)).await.unwrap();

        let tree = get_main_category(&pool, main.id).await.unwrap().unwrap();
        let mut names: Vec<_> = tree.subcategories.iter().map(|c| c.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["Go", "Rust"]);

        let mains = list_main_categories(&pool).await.unwrap();
        assert_eq!(mains.len(), 1);
    }

    #[tokio::test]
    async fn tree_depth_is_capped_at_two() {
        let pool = test_pool().await;
        let main = create_category(&pool, &main_req("Programming")).await.unwrap();
        let sub = create_category(&pool, &sub_req("Rust", main.id)).await.unwrap();

        let err = create_category(&pool, &sub_req("Tokio", sub.id)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let orphan = CreateCategoryRequest {
            name: "Orphan".to_string(),
            category_type: CategoryType::Sub,
            parent_category: None,
        };
        assert!(matches!(
            create_category(&pool, &orphan).await.unwrap_err(),
            AppError::BadRequest(_)
        ));

        // 하위 카테고리가 있는 main을 sub로 내릴 수 없습니다.
        let other = create_category(&pool, &main_req("Design")).await.unwrap();
        let demote = UpdateCategoryRequest {
            name: None,
            category_type: Some(CategoryType::Sub),
            parent_category: Some(Some(other.id)),
        };
        assert!(matches!(
            update_category(&pool, main.id, &demote).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn deleting_main_removes_subcategories() {
        let pool = test_pool().await;
        let main = create_category(&pool, &main_req("Programming")).await.unwrap();
        let sub = create_category(&pool, &sub_req("Rust", main.id)).await.unwrap();

        assert!(delete_category(&pool, main.id).await.unwrap());
        assert!(get_category(&pool, sub.id).await.unwrap().is_none());
    }
}
