//! Product Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::{Money, Percentage};
use crate::PricingError;

pub const DEFAULT_BULK_THRESHOLD: u32 = 10;

/// Variant-specific pricing modifiers of a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingRule {
    Plain,
    Seasonal { seasonal_discount: Percentage },
    Bulk { bulk_threshold: u32, bulk_discount: Percentage },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind { Plain, Seasonal, Bulk }

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Plain => "plain", Self::Seasonal => "seasonal", Self::Bulk => "bulk" }
    }
}

impl std::str::FromStr for ProductKind {
    type Err = PricingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "seasonal" => Ok(Self::Seasonal),
            "bulk" => Ok(Self::Bulk),
            other => Err(PricingError::UnknownVariant(other.to_string())),
        }
    }
}

impl PricingRule {
    pub fn kind(&self) -> ProductKind {
        match self {
            Self::Plain => ProductKind::Plain,
            Self::Seasonal { .. } => ProductKind::Seasonal,
            Self::Bulk { .. } => ProductKind::Bulk,
        }
    }

    /// Rebuilds a rule from its flattened storage columns.
    pub fn from_parts(
        kind: ProductKind,
        seasonal_discount: Option<Percentage>,
        bulk_threshold: Option<u32>,
        bulk_discount: Option<Percentage>,
    ) -> Result<Self, PricingError> {
        match kind {
            ProductKind::Plain => Ok(Self::Plain),
            ProductKind::Seasonal => Ok(Self::Seasonal {
                seasonal_discount: seasonal_discount
                    .ok_or(PricingError::MissingModifier { variant: "seasonal product", field: "seasonal_discount" })?,
            }),
            ProductKind::Bulk => Ok(Self::Bulk {
                bulk_threshold: bulk_threshold
                    .ok_or(PricingError::MissingModifier { variant: "bulk product", field: "bulk_threshold" })?,
                bulk_discount: bulk_discount
                    .ok_or(PricingError::MissingModifier { variant: "bulk product", field: "bulk_discount" })?,
            }),
        }
    }

    pub fn seasonal_discount(&self) -> Option<Percentage> {
        match self { Self::Seasonal { seasonal_discount } => Some(*seasonal_discount), _ => None }
    }

    pub fn bulk_threshold(&self) -> Option<u32> {
        match self { Self::Bulk { bulk_threshold, .. } => Some(*bulk_threshold), _ => None }
    }

    pub fn bulk_discount(&self) -> Option<Percentage> {
        match self { Self::Bulk { bulk_discount, .. } => Some(*bulk_discount), _ => None }
    }
}

#[derive(Clone, Debug)]
pub struct Product {
    id: Uuid,
    name: String,
    price: Money,
    rule: PricingRule,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Product {
    pub fn create(name: impl Into<String>, price: Money, rule: PricingRule) -> Result<Self, ProductError> {
        let name = name.into().trim().to_string();
        if name.is_empty() { return Err(ProductError::MissingName); }
        if name.chars().count() > 100 { return Err(ProductError::NameTooLong); }
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut product = Self { id, name, price, rule, created_at: now, updated_at: now, events: vec![] };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id, kind: product.rule.kind() }));
        Ok(product)
    }

    /// Rehydrates a stored product. Raises no events.
    pub fn restore(
        id: Uuid,
        name: String,
        price: Money,
        rule: PricingRule,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self { id, name, price, rule, created_at, updated_at, events: vec![] }
    }

    pub fn plain(name: impl Into<String>, price: Money) -> Result<Self, ProductError> {
        Self::create(name, price, PricingRule::Plain)
    }

    pub fn seasonal(name: impl Into<String>, price: Money, seasonal_discount: Percentage) -> Result<Self, ProductError> {
        Self::create(name, price, PricingRule::Seasonal { seasonal_discount })
    }

    pub fn bulk(name: impl Into<String>, price: Money, bulk_threshold: u32, bulk_discount: Percentage) -> Result<Self, ProductError> {
        Self::create(name, price, PricingRule::Bulk { bulk_threshold, bulk_discount })
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> Money { self.price }
    pub fn rule(&self) -> &PricingRule { &self.rule }
    pub fn kind(&self) -> ProductKind { self.rule.kind() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { MissingName, NameTooLong }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "This field may not be blank."),
            Self::NameTooLong => write!(f, "Ensure this field has no more than 100 characters."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(v: rust_decimal::Decimal) -> Money { Money::new(v).unwrap() }

    #[test]
    fn test_product_create() {
        let mut p = Product::plain("  Widget ", money(dec!(19.99))).unwrap();
        assert_eq!(p.name(), "Widget");
        assert_eq!(p.kind(), ProductKind::Plain);
        let events = p.take_events();
        assert_eq!(events.len(), 1);
        assert!(p.take_events().is_empty());
    }

    #[test]
    fn test_product_name_rules() {
        assert_eq!(Product::plain("   ", money(dec!(1))).unwrap_err(), ProductError::MissingName);
        assert_eq!(Product::plain("x".repeat(101), money(dec!(1))).unwrap_err(), ProductError::NameTooLong);
        assert!(Product::plain("x".repeat(100), money(dec!(1))).is_ok());
    }

    #[test]
    fn test_rule_from_parts_requires_modifiers() {
        let err = PricingRule::from_parts(ProductKind::Bulk, None, Some(10), None).unwrap_err();
        assert!(matches!(err, PricingError::MissingModifier { field: "bulk_discount", .. }));
        let err = PricingRule::from_parts(ProductKind::Seasonal, None, None, None).unwrap_err();
        assert!(matches!(err, PricingError::MissingModifier { field: "seasonal_discount", .. }));
        assert_eq!(PricingRule::from_parts(ProductKind::Plain, None, Some(3), None).unwrap(), PricingRule::Plain);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [ProductKind::Plain, ProductKind::Seasonal, ProductKind::Bulk] {
            assert_eq!(kind.as_str().parse::<ProductKind>().unwrap(), kind);
        }
        assert!("gift".parse::<ProductKind>().is_err());
    }

    #[test]
    fn test_rule_serializes_flat() {
        let rule = PricingRule::Bulk { bulk_threshold: 10, bulk_discount: Percentage::new(dec!(20)).unwrap() };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "bulk");
        assert_eq!(json["bulk_threshold"], 10);
        assert_eq!(json["bulk_discount"], "20");
    }
}
