use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Listing, Page, Store};
use crate::domain::aggregates::{Discount, DiscountTag, Order, Product, ProductKind};
use crate::Result;

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    discounts: Vec<Discount>,
    orders: Vec<Order>,
}

/// In-process store. Rows are kept in insertion order and listed newest first.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

fn paginate<'a, T: Clone + 'a>(rows: impl DoubleEndedIterator<Item = &'a T>, page: Page) -> Listing<T> {
    let matching: Vec<&T> = rows.rev().collect();
    let items = matching
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .map(|row| (*row).clone())
        .collect();
    Listing { items, total: matching.len() as i64 }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_product(&self, product: &Product) -> Result<()> {
        self.tables.write().await.products.push(product.clone());
        Ok(())
    }

    async fn list_products(&self, kind: Option<ProductKind>, page: Page) -> Result<Listing<Product>> {
        let tables = self.tables.read().await;
        let rows = tables.products.iter().filter(|p| kind.map_or(true, |k| p.kind() == k));
        Ok(paginate(rows, page))
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().filter(|p| ids.contains(&p.id())).cloned().collect())
    }

    async fn create_discount(&self, discount: &Discount) -> Result<()> {
        self.tables.write().await.discounts.push(discount.clone());
        Ok(())
    }

    async fn list_discounts(&self, tag: Option<DiscountTag>, page: Page) -> Result<Listing<Discount>> {
        let tables = self.tables.read().await;
        let rows = tables.discounts.iter().filter(|d| tag.map_or(true, |t| d.kind().tag() == t));
        Ok(paginate(rows, page))
    }

    async fn find_discount(&self, id: Uuid) -> Result<Option<Discount>> {
        let tables = self.tables.read().await;
        Ok(tables.discounts.iter().find(|d| d.id() == id).cloned())
    }

    async fn create_order(&self, order: &Order) -> Result<()> {
        self.tables.write().await.orders.push(order.clone());
        Ok(())
    }

    async fn list_orders(&self, page: Page) -> Result<Listing<Order>> {
        let tables = self.tables.read().await;
        Ok(paginate(tables.orders.iter(), page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::OrderLine;
    use crate::domain::value_objects::{Money, Percentage, Quantity};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_list_products_filters_by_kind_newest_first() {
        let store = MemoryStore::new();
        let plain = Product::plain("Pen", Money::new(dec!(2)).unwrap()).unwrap();
        let first = Product::seasonal("Sled", Money::new(dec!(50)).unwrap(), Percentage::new(dec!(10)).unwrap()).unwrap();
        let second = Product::seasonal("Skates", Money::new(dec!(80)).unwrap(), Percentage::new(dec!(5)).unwrap()).unwrap();
        for p in [&plain, &first, &second] { store.create_product(p).await.unwrap(); }

        let all = store.list_products(None, Page::default()).await.unwrap();
        assert_eq!(all.total, 3);

        let seasonal = store.list_products(Some(ProductKind::Seasonal), Page::default()).await.unwrap();
        assert_eq!(seasonal.total, 2);
        assert_eq!(seasonal.items[0].id(), second.id());

        let second_page = store.list_products(None, Page::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(second_page.items.len(), 1);
        assert_eq!(second_page.items[0].id(), plain.id());
    }

    #[tokio::test]
    async fn test_find_products_skips_unknown() {
        let store = MemoryStore::new();
        let p = Product::plain("Pen", Money::new(dec!(2)).unwrap()).unwrap();
        store.create_product(&p).await.unwrap();
        let found = store.find_products(&[p.id(), Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_orders_round_trip() {
        let store = MemoryStore::new();
        let p = Product::plain("Pen", Money::new(dec!(2)).unwrap()).unwrap();
        let order = Order::place(vec![OrderLine::new(p, Quantity::new(3).unwrap())], None).unwrap();
        store.create_order(&order).await.unwrap();
        let listed = store.list_orders(Page::default()).await.unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0].total_price().amount(), dec!(6));
    }
}
