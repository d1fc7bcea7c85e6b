//! Order Aggregate

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::aggregates::{Discount, Product};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::pricing;
use crate::domain::value_objects::{Money, Quantity};

/// A product snapshot and the quantity ordered.
#[derive(Clone, Debug)]
pub struct OrderLine { pub product: Product, pub quantity: Quantity }

impl OrderLine {
    pub fn new(product: Product, quantity: Quantity) -> Self { Self { product, quantity } }
}

/// Lines, an optional discount and the total computed when the order was placed.
///
/// The total is never recomputed afterwards, even if the referenced products
/// or discount change later.
#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    lines: Vec<OrderLine>,
    discount: Option<Discount>,
    total_price: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Order {
    pub fn place(lines: Vec<OrderLine>, discount: Option<Discount>) -> Result<Self, OrderError> {
        if lines.is_empty() { return Err(OrderError::NoItems); }
        let now = Utc::now();
        let mut order = Self {
            id: Uuid::now_v7(), lines, discount, total_price: Money::ZERO,
            created_at: now, updated_at: now, events: vec![],
        };
        order.total_price = pricing::order_total(&order).rounded();
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: order.id, total: order.total_price.amount() }));
        Ok(order)
    }

    /// Rehydrates a stored order with its frozen total. Raises no events.
    pub fn restore(
        id: Uuid,
        lines: Vec<OrderLine>,
        discount: Option<Discount>,
        total_price: Money,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self { id, lines, discount, total_price, created_at, updated_at, events: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn lines(&self) -> &[OrderLine] { &self.lines }
    pub fn discount(&self) -> Option<&Discount> { self.discount.as_ref() }
    pub fn total_price(&self) -> Money { self.total_price }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NoItems => write!(f, "An order needs at least one product.") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Percentage;
    use rust_decimal_macros::dec;

    fn line(price: rust_decimal::Decimal, qty: u32) -> OrderLine {
        let product = Product::plain("Widget", Money::new(price).unwrap()).unwrap();
        OrderLine::new(product, Quantity::new(qty).unwrap())
    }

    #[test]
    fn test_place_computes_total() {
        let mut order = Order::place(vec![line(dec!(10), 2), line(dec!(20), 1)], None).unwrap();
        assert_eq!(order.total_price().amount(), dec!(40));
        let events = order.take_events();
        assert!(matches!(events.as_slice(), [DomainEvent::Order(OrderEvent::Placed { .. })]));
    }

    #[test]
    fn test_place_with_discount() {
        let discount = Discount::percentage("Ten", Percentage::new(dec!(10)).unwrap()).unwrap();
        let order = Order::place(vec![line(dec!(10), 2), line(dec!(20), 1)], Some(discount)).unwrap();
        assert_eq!(order.total_price().to_string(), "36.00");
    }

    #[test]
    fn test_empty_order_rejected() {
        assert_eq!(Order::place(vec![], None).unwrap_err(), OrderError::NoItems);
    }

    #[test]
    fn test_restored_total_is_not_recomputed() {
        let placed = Order::place(vec![line(dec!(10), 2)], None).unwrap();
        let stale = Money::new(dec!(15)).unwrap();
        let restored = Order::restore(placed.id(), placed.lines().to_vec(), None, stale, placed.created_at(), placed.updated_at());
        assert_eq!(restored.total_price(), stale);
        assert_eq!(pricing::order_total(&restored).amount(), dec!(20));
    }
}
