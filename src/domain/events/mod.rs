//! Domain events
use crate::domain::aggregates::{DiscountTag, ProductKind};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Discount(DiscountEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, kind: ProductKind },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiscountEvent {
    Created { discount_id: Uuid, kind: DiscountTag },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, total: Decimal },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "pricing.product.created",
            Self::Discount(DiscountEvent::Created { .. }) => "pricing.discount.created",
            Self::Order(OrderEvent::Placed { .. }) => "pricing.order.placed",
        }
    }
}
