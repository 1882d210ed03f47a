//! Row structs and response shapes for the API.
//!
//! Structs here derive `sqlx::FromRow` where they are read straight from a
//! query, and `Serialize` with camelCase field names where they go out on
//! the wire. Monetary fields are `Decimal` and serialize as strings.

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;
pub mod wishlist;

pub use address::{Address, AddressInput};
pub use cart::{CartLine, CartSummary, CartView, LineVerdict, ValidatedLine};
pub use category::{Breadcrumb, Category, CategoryWithCount};
pub use order::{Order, OrderItem, OrderListItem, OrderTracking, OrderWithItems};
pub use product::{Product, ProductDetail, ProductImage, ProductListItem};
pub use user::User;
pub use wishlist::WishlistEntry;

use serde::Serialize;

/// Pagination metadata attached to listing responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Build pagination metadata from a total row count.
    #[must_use]
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Row offset for the current page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_rounds_up() {
        let p = Pagination::new(1, 12, 25);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_offset() {
        let p = Pagination::new(3, 10, 100);
        assert_eq!(p.offset(), 20);
        assert_eq!(p.total_pages, 10);
    }

    #[test]
    fn test_pagination_exact_multiple() {
        let p = Pagination::new(2, 12, 24);
        assert_eq!(p.total_pages, 2);
    }

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::new(1, 12, 0);
        assert_eq!(p.total_pages, 0);
    }
}
