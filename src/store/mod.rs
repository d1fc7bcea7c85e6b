//! Persistence for products, discounts and orders
//!
//! [`PgStore`] backs the service in production; [`MemoryStore`] keeps the
//! same contract in process for tests and database-less local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Discount, DiscountTag, Order, Product, ProductKind};
use crate::Result;

/// 1-based page of a newest-first listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 { self.per_page as i64 }
    pub fn offset(&self) -> i64 { (self.page as i64 - 1) * self.per_page as i64 }
}

impl Default for Page {
    fn default() -> Self { Self::new(None, None) }
}

/// One page of results plus the unpaged count.
#[derive(Clone, Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_product(&self, product: &Product) -> Result<()>;

    /// `None` lists every variant.
    async fn list_products(&self, kind: Option<ProductKind>, page: Page) -> Result<Listing<Product>>;

    /// Products with the given ids, in no particular order. Unknown ids are skipped.
    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;

    async fn create_discount(&self, discount: &Discount) -> Result<()>;

    async fn list_discounts(&self, tag: Option<DiscountTag>, page: Page) -> Result<Listing<Discount>>;

    async fn find_discount(&self, id: Uuid) -> Result<Option<Discount>>;

    /// Stores the order and all of its lines, or nothing.
    async fn create_order(&self, order: &Order) -> Result<()>;

    async fn list_orders(&self, page: Page) -> Result<Listing<Order>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_caps() {
        assert_eq!(Page::default(), Page { page: 1, per_page: 20 });
        let p = Page::new(Some(0), Some(500));
        assert_eq!(p, Page { page: 1, per_page: 100 });
        let p = Page::new(Some(3), Some(10));
        assert_eq!((p.limit(), p.offset()), (10, 20));
    }
}
