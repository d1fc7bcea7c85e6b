//! Discount Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{DiscountEvent, DomainEvent};
use crate::domain::value_objects::{Money, Percentage};
use crate::PricingError;

/// Rule a discount applies to a price.
///
/// `Base` is a named discount without a rule; it leaves prices unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountKind {
    Base,
    Percentage { percentage: Percentage },
    FixedAmount { amount: Money },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTag { Base, Percentage, FixedAmount }

impl DiscountTag {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Base => "base", Self::Percentage => "percentage", Self::FixedAmount => "fixed_amount" }
    }
}

impl std::str::FromStr for DiscountTag {
    type Err = PricingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "percentage" => Ok(Self::Percentage),
            "fixed_amount" => Ok(Self::FixedAmount),
            other => Err(PricingError::UnknownVariant(other.to_string())),
        }
    }
}

impl DiscountKind {
    pub fn tag(&self) -> DiscountTag {
        match self {
            Self::Base => DiscountTag::Base,
            Self::Percentage { .. } => DiscountTag::Percentage,
            Self::FixedAmount { .. } => DiscountTag::FixedAmount,
        }
    }

    /// Rebuilds a discount rule from its flattened storage columns.
    pub fn from_parts(tag: DiscountTag, percentage: Option<Percentage>, amount: Option<Money>) -> Result<Self, PricingError> {
        match tag {
            DiscountTag::Base => Ok(Self::Base),
            DiscountTag::Percentage => Ok(Self::Percentage {
                percentage: percentage.ok_or(PricingError::MissingModifier { variant: "percentage discount", field: "percentage" })?,
            }),
            DiscountTag::FixedAmount => Ok(Self::FixedAmount {
                amount: amount.ok_or(PricingError::MissingModifier { variant: "fixed amount discount", field: "amount" })?,
            }),
        }
    }

    pub fn percentage(&self) -> Option<Percentage> {
        match self { Self::Percentage { percentage } => Some(*percentage), _ => None }
    }

    pub fn amount(&self) -> Option<Money> {
        match self { Self::FixedAmount { amount } => Some(*amount), _ => None }
    }
}

#[derive(Clone, Debug)]
pub struct Discount {
    id: Uuid,
    name: String,
    kind: DiscountKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Discount {
    pub fn create(name: impl Into<String>, kind: DiscountKind) -> Result<Self, DiscountError> {
        let name = name.into().trim().to_string();
        if name.is_empty() { return Err(DiscountError::MissingName); }
        if name.chars().count() > 100 { return Err(DiscountError::NameTooLong); }
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut discount = Self { id, name, kind, created_at: now, updated_at: now, events: vec![] };
        discount.raise_event(DomainEvent::Discount(DiscountEvent::Created { discount_id: id, kind: discount.kind.tag() }));
        Ok(discount)
    }

    /// Rehydrates a stored discount. Raises no events.
    pub fn restore(id: Uuid, name: String, kind: DiscountKind, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { id, name, kind, created_at, updated_at, events: vec![] }
    }

    pub fn percentage(name: impl Into<String>, percentage: Percentage) -> Result<Self, DiscountError> {
        Self::create(name, DiscountKind::Percentage { percentage })
    }

    pub fn fixed_amount(name: impl Into<String>, amount: Money) -> Result<Self, DiscountError> {
        Self::create(name, DiscountKind::FixedAmount { amount })
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> &DiscountKind { &self.kind }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum DiscountError { MissingName, NameTooLong }
impl std::error::Error for DiscountError {}
impl std::fmt::Display for DiscountError {
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

    #[test]
    fn test_discount_create() {
        let mut d = Discount::percentage("Spring", Percentage::new(dec!(15)).unwrap()).unwrap();
        assert_eq!(d.kind().tag(), DiscountTag::Percentage);
        assert_eq!(d.kind().percentage().unwrap().value(), dec!(15));
        assert_eq!(d.take_events().len(), 1);
        assert!(d.take_events().is_empty());
    }

    #[test]
    fn test_discount_from_parts() {
        let err = DiscountKind::from_parts(DiscountTag::FixedAmount, None, None).unwrap_err();
        assert!(matches!(err, PricingError::MissingModifier { field: "amount", .. }));
        assert_eq!(DiscountKind::from_parts(DiscountTag::Base, None, None).unwrap(), DiscountKind::Base);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(Discount::create("", DiscountKind::Base).unwrap_err(), DiscountError::MissingName);
    }
}
