//! Category repository.

use std::collections::HashMap;

use sqlx::PgPool;

use hearthside_core::CategoryId;

use super::RepositoryError;
use crate::models::category::{Breadcrumb, Category, CategoryWithCount};

/// How a category is addressed in a path segment: a numeric segment is an
/// id, anything else a slug.
#[derive(Debug, Clone)]
pub enum CategoryRef {
    Id(CategoryId),
    Slug(String),
}

impl CategoryRef {
    /// Parse a path segment into an id or slug reference.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        segment
            .parse::<i32>()
            .map_or_else(|_| Self::Slug(segment.to_string()), |id| Self::Id(CategoryId::new(id)))
    }
}

/// Repository for category tree operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active top-level categories with nested active subcategories
    /// and product counts.
    ///
    /// A parent's count includes products in its direct subcategories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_tree(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let categories: Vec<Category> = sqlx::query_as(
            r"
            SELECT id, name, slug, description, image_url, parent_id, sort_order
            FROM categories
            WHERE is_active
            ORDER BY sort_order ASC, name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let counts: Vec<(CategoryId, i64)> = sqlx::query_as(
            r"
            SELECT c.id, COUNT(p.id)
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id AND p.is_active
            WHERE c.is_active
            GROUP BY c.id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        let direct_counts: HashMap<CategoryId, i64> = counts.into_iter().collect();

        let (parents, children): (Vec<_>, Vec<_>) =
            categories.into_iter().partition(|c| c.parent_id.is_none());

        let mut tree = Vec::with_capacity(parents.len());
        for parent in parents {
            let subcategories: Vec<CategoryWithCount> = children
                .iter()
                .filter(|c| c.parent_id == Some(parent.id))
                .map(|c| CategoryWithCount {
                    product_count: direct_counts.get(&c.id).copied().unwrap_or(0),
                    category: c.clone(),
                    subcategories: Vec::new(),
                })
                .collect();

            let product_count = direct_counts.get(&parent.id).copied().unwrap_or(0)
                + subcategories.iter().map(|s| s.product_count).sum::<i64>();

            tree.push(CategoryWithCount {
                category: parent,
                product_count,
                subcategories,
            });
        }

        Ok(tree)
    }

    /// Get an active category by id or slug, with its active subcategories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if missing or inactive.
    pub async fn get(
        &self,
        category_ref: &CategoryRef,
    ) -> Result<(Category, Vec<Category>), RepositoryError> {
        let row: Option<Category> = match category_ref {
            CategoryRef::Id(id) => {
                sqlx::query_as(
                    r"
                    SELECT id, name, slug, description, image_url, parent_id, sort_order
                    FROM categories WHERE id = $1 AND is_active
                    ",
                )
                .bind(*id)
                .fetch_optional(self.pool)
                .await?
            }
            CategoryRef::Slug(slug) => {
                sqlx::query_as(
                    r"
                    SELECT id, name, slug, description, image_url, parent_id, sort_order
                    FROM categories WHERE slug = $1 AND is_active
                    ",
                )
                .bind(slug)
                .fetch_optional(self.pool)
                .await?
            }
        };

        let category = row.ok_or(RepositoryError::NotFound)?;

        let subcategories: Vec<Category> = sqlx::query_as(
            r"
            SELECT id, name, slug, description, image_url, parent_id, sort_order
            FROM categories
            WHERE parent_id = $1 AND is_active
            ORDER BY sort_order ASC, name ASC
            ",
        )
        .bind(category.id)
        .fetch_all(self.pool)
        .await?;

        Ok((category, subcategories))
    }

    /// The ancestor chain root-to-leaf for a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is missing or
    /// inactive.
    pub async fn breadcrumbs(
        &self,
        category_ref: &CategoryRef,
    ) -> Result<Vec<Breadcrumb>, RepositoryError> {
        let (category, _) = self.get(category_ref).await?;

        let mut chain = vec![Breadcrumb {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }];

        // Walk up the parent links. The self-FK keeps the tree shallow in
        // practice; the bound guards against a cycle introduced by bad data.
        let mut cursor = category.parent_id;
        for _ in 0..16 {
            let Some(parent_id) = cursor else { break };
            let parent: Option<(CategoryId, String, String, Option<CategoryId>)> =
                sqlx::query_as(
                    "SELECT id, name, slug, parent_id FROM categories WHERE id = $1",
                )
                .bind(parent_id)
                .fetch_optional(self.pool)
                .await?;

            let Some((id, name, slug, next)) = parent else { break };
            chain.push(Breadcrumb { id, name, slug });
            cursor = next;
        }

        chain.reverse();
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ref_numeric_is_id() {
        assert!(matches!(
            CategoryRef::parse("42"),
            CategoryRef::Id(id) if id == CategoryId::new(42)
        ));
    }

    #[test]
    fn test_category_ref_text_is_slug() {
        assert!(matches!(
            CategoryRef::parse("kitchen-textiles"),
            CategoryRef::Slug(s) if s == "kitchen-textiles"
        ));
    }
}
