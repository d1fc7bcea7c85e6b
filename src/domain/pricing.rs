//! Pricing engine
//!
//! Resolves unit prices per product variant, applies discounts and totals
//! orders. Every function here is pure; all arithmetic is exact decimal.

use crate::domain::aggregates::{Discount, DiscountKind, Order, PricingRule, Product};
use crate::domain::value_objects::{Money, Quantity};

/// Price of one unit of something, given how many are bought.
pub trait UnitPricing {
    fn unit_price(&self, quantity: Quantity) -> Money;
}

/// Transformation of a price under a discount. Never yields a negative price.
pub trait DiscountRule {
    fn apply(&self, price: Money) -> Money;
}

impl UnitPricing for Product {
    fn unit_price(&self, quantity: Quantity) -> Money {
        let base = self.price();
        match self.rule() {
            PricingRule::Plain => base,
            PricingRule::Seasonal { seasonal_discount } => base.reduce_by(seasonal_discount),
            PricingRule::Bulk { bulk_threshold, bulk_discount } if quantity.reaches(*bulk_threshold) => {
                base.reduce_by(bulk_discount)
            }
            PricingRule::Bulk { .. } => base,
        }
    }
}

impl DiscountRule for DiscountKind {
    fn apply(&self, price: Money) -> Money {
        match self {
            DiscountKind::Base => price,
            DiscountKind::Percentage { percentage } => price.reduce_by(percentage),
            DiscountKind::FixedAmount { amount } => price.saturating_sub(amount),
        }
    }
}

impl DiscountRule for Discount {
    fn apply(&self, price: Money) -> Money { self.kind().apply(price) }
}

// No discount leaves the price untouched.
impl<D: DiscountRule> DiscountRule for Option<&D> {
    fn apply(&self, price: Money) -> Money {
        match self { Some(d) => d.apply(price), None => price }
    }
}

pub fn unit_price(product: &impl UnitPricing, quantity: Quantity) -> Money {
    product.unit_price(quantity)
}

pub fn apply_discount(discount: &impl DiscountRule, price: Money) -> Money {
    discount.apply(price)
}

/// Sum over lines of the discounted unit price times quantity.
///
/// The discount is applied per unit, before multiplying by quantity.
pub fn order_total(order: &Order) -> Money {
    let discount = order.discount();
    order
        .lines()
        .iter()
        .map(|line| apply_discount(&discount, unit_price(&line.product, line.quantity)).multiply(line.quantity))
        .sum()
}
