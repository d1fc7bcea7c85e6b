//! Dynamic Pricing Service
//!
//! Prices products and orders for a small storefront.
//!
//! ## Features
//! - Plain, seasonal and bulk product pricing
//! - Base, percentage and fixed-amount discounts
//! - Order placement with a total frozen at creation
//! - PostgreSQL or in-memory persistence
//! - Domain events forwarded to NATS

pub mod api;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod store;

use thiserror::Error;
use uuid::Uuid;

pub use domain::aggregates::{Discount, DiscountKind, Order, OrderLine, PricingRule, Product};
pub use domain::pricing::{apply_discount, order_total, unit_price, DiscountRule, UnitPricing};
pub use domain::value_objects::{Money, Percentage, Quantity};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(rust_decimal::Decimal),

    #[error("Percentage must not be negative: {0}")]
    NegativePercentage(rust_decimal::Decimal),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("{variant} requires `{field}`")]
    MissingModifier { variant: &'static str, field: &'static str },

    #[error("Unknown variant `{0}`")]
    UnknownVariant(String),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<sqlx::Error> for PricingError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for PricingError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;
