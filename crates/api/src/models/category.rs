//! Category tree models.

use serde::Serialize;

use hearthside_core::CategoryId;

/// A category row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
}

/// A category with its product count and nested active subcategories.
///
/// For a parent category the count includes products in its direct
/// subcategories; for a leaf it is the direct product count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<CategoryWithCount>,
}

/// One step in a category's ancestor chain, root first.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}
