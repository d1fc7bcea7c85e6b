//! Aggregates module
pub mod discount;
pub mod order;
pub mod product;

pub use discount::{Discount, DiscountError, DiscountKind, DiscountTag};
pub use order::{Order, OrderError, OrderLine};
pub use product::{PricingRule, Product, ProductError, ProductKind, DEFAULT_BULK_THRESHOLD};
