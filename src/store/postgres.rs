use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Listing, Page, Store};
use crate::domain::aggregates::{
    Discount, DiscountKind, DiscountTag, Order, OrderLine, PricingRule, Product, ProductKind,
};
use crate::domain::value_objects::{Money, Percentage, Quantity};
use crate::{PricingError, Result};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_lines(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderLine>>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT oi.order_id, oi.quantity, p.* FROM order_items oi \
             JOIN products p ON p.id = oi.product_id \
             WHERE oi.order_id = ANY($1) ORDER BY oi.order_id, oi.position",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let quantity = u32::try_from(row.quantity).map_err(|_| corrupt("order_items.quantity", row.quantity))?;
            let line = OrderLine::new(row.product.try_into()?, Quantity::new(quantity)?);
            lines.entry(row.order_id).or_default().push(line);
        }
        Ok(lines)
    }

    async fn load_discounts(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Discount>> {
        let rows = sqlx::query_as::<_, DiscountRow>("SELECT * FROM discounts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| Discount::try_from(row).map(|d| (d.id(), d)))
            .collect()
    }
}

fn corrupt(column: &str, value: impl std::fmt::Display) -> PricingError {
    PricingError::StorageError(format!("invalid value in {column}: {value}"))
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    kind: String,
    price: Decimal,
    seasonal_discount: Option<Decimal>,
    bulk_threshold: Option<i32>,
    bulk_discount: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = PricingError;

    fn try_from(row: ProductRow) -> Result<Self> {
        let bulk_threshold = row
            .bulk_threshold
            .map(|t| u32::try_from(t).map_err(|_| corrupt("products.bulk_threshold", t)))
            .transpose()?;
        let rule = PricingRule::from_parts(
            row.kind.parse()?,
            row.seasonal_discount.map(Percentage::new).transpose()?,
            bulk_threshold,
            row.bulk_discount.map(Percentage::new).transpose()?,
        )?;
        Ok(Product::restore(row.id, row.name, Money::new(row.price)?, rule, row.created_at, row.updated_at))
    }
}

#[derive(sqlx::FromRow)]
struct DiscountRow {
    id: Uuid,
    name: String,
    kind: String,
    percentage: Option<Decimal>,
    amount: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DiscountRow> for Discount {
    type Error = PricingError;

    fn try_from(row: DiscountRow) -> Result<Self> {
        let kind = DiscountKind::from_parts(
            row.kind.parse()?,
            row.percentage.map(Percentage::new).transpose()?,
            row.amount.map(Money::new).transpose()?,
        )?;
        Ok(Discount::restore(row.id, row.name, kind, row.created_at, row.updated_at))
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    discount_id: Option<Uuid>,
    total_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

#[async_trait]
impl Store for PgStore {
    async fn create_product(&self, product: &Product) -> Result<()> {
        let rule = product.rule();
        sqlx::query(
            "INSERT INTO products (id, name, kind, price, seasonal_discount, bulk_threshold, bulk_discount, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(product.id())
        .bind(product.name())
        .bind(product.kind().as_str())
        .bind(product.price().amount())
        .bind(rule.seasonal_discount().map(|p| p.value()))
        .bind(rule.bulk_threshold().map(|t| t as i32))
        .bind(rule.bulk_discount().map(|p| p.value()))
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_products(&self, kind: Option<ProductKind>, page: Page) -> Result<Listing<Product>> {
        let kind = kind.map(|k| k.as_str());
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE ($1::text IS NULL OR kind = $1) ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(kind)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR kind = $1)")
            .bind(kind)
            .fetch_one(&self.pool)
            .await?;
        let items = rows.into_iter().map(Product::try_from).collect::<Result<Vec<_>>>()?;
        Ok(Listing { items, total: total.0 })
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn create_discount(&self, discount: &Discount) -> Result<()> {
        let kind = discount.kind();
        sqlx::query(
            "INSERT INTO discounts (id, name, kind, percentage, amount, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(discount.id())
        .bind(discount.name())
        .bind(kind.tag().as_str())
        .bind(kind.percentage().map(|p| p.value()))
        .bind(kind.amount().map(|a| a.amount()))
        .bind(discount.created_at())
        .bind(discount.updated_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_discounts(&self, tag: Option<DiscountTag>, page: Page) -> Result<Listing<Discount>> {
        let tag = tag.map(|t| t.as_str());
        let rows = sqlx::query_as::<_, DiscountRow>(
            "SELECT * FROM discounts WHERE ($1::text IS NULL OR kind = $1) ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(tag)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM discounts WHERE ($1::text IS NULL OR kind = $1)")
            .bind(tag)
            .fetch_one(&self.pool)
            .await?;
        let items = rows.into_iter().map(Discount::try_from).collect::<Result<Vec<_>>>()?;
        Ok(Listing { items, total: total.0 })
    }

    async fn find_discount(&self, id: Uuid) -> Result<Option<Discount>> {
        sqlx::query_as::<_, DiscountRow>("SELECT * FROM discounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Discount::try_from)
            .transpose()
    }

    async fn create_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO orders (id, discount_id, total_price, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(order.id())
            .bind(order.discount().map(|d| d.id()))
            .bind(order.total_price().amount())
            .bind(order.created_at())
            .bind(order.updated_at())
            .execute(&mut *tx)
            .await?;
        for (position, line) in order.lines().iter().enumerate() {
            sqlx::query("INSERT INTO order_items (id, order_id, product_id, quantity, position) VALUES ($1, $2, $3, $4, $5)")
                .bind(Uuid::now_v7())
                .bind(order.id())
                .bind(line.product.id())
                .bind(line.quantity.value() as i32)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_orders(&self, page: Page) -> Result<Listing<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(&self.pool).await?;

        let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let discount_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.discount_id).collect();
        let mut lines = self.load_lines(&order_ids).await?;
        let discounts = self.load_discounts(&discount_ids).await?;

        let items = rows
            .into_iter()
            .map(|row| -> Result<Order> {
                let discount = row.discount_id.and_then(|id| discounts.get(&id).cloned());
                Ok(Order::restore(
                    row.id,
                    lines.remove(&row.id).unwrap_or_default(),
                    discount,
                    Money::new(row.total_price)?,
                    row.created_at,
                    row.updated_at,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Listing { items, total: total.0 })
    }
}
