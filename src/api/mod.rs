//! HTTP surface: list/create endpoints for products, discounts and orders

pub mod discounts;
pub mod error;
pub mod orders;
pub mod products;
pub mod validation;

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Percentage;
use crate::publisher::EventPublisher;
use crate::store::{Listing, Page, Store};

pub use error::{ApiError, FieldErrors, SOMETHING_WENT_WRONG};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub publisher: EventPublisher,
    pub max_discount: Percentage,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, publisher: EventPublisher, max_discount: Percentage) -> Self {
        Self { store, publisher, max_discount }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "dynamic-pricing"})) }))
        .route("/api/v1/products", get(products::list_products).post(products::create_product))
        .route("/api/v1/products/seasonal", get(products::list_seasonal_products).post(products::create_seasonal_product))
        .route("/api/v1/products/bulk", get(products::list_bulk_products).post(products::create_bulk_product))
        .route("/api/v1/discounts", get(discounts::list_discounts).post(discounts::create_discount))
        .route("/api/v1/discounts/percentage", get(discounts::list_percentage_discounts).post(discounts::create_percentage_discount))
        .route("/api/v1/discounts/fixed", get(discounts::list_fixed_discounts).post(discounts::create_fixed_discount))
        .route("/api/v1/orders", get(orders::list_orders).post(orders::create_order))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)] pub struct ListParams { pub page: Option<u32>, pub per_page: Option<u32> }
#[derive(Debug, Serialize)] pub struct PaginatedResponse<T> { pub data: Vec<T>, pub total: i64, pub page: u32 }

impl ListParams {
    pub fn page(&self) -> Page { Page::new(self.page, self.per_page) }
}

impl<T> PaginatedResponse<T> {
    pub fn from_listing<S>(listing: Listing<S>, page: Page, view: impl Fn(&S) -> T) -> Self {
        Self { data: listing.items.iter().map(view).collect(), total: listing.total, page: page.page }
    }
}

/// `{message, data}` envelope returned on successful creation.
#[derive(Debug, Serialize)]
pub struct Created<T> { pub message: String, pub data: T }

pub fn created<T: Serialize>(module: &str, data: T) -> (StatusCode, Json<Created<T>>) {
    (StatusCode::CREATED, Json(Created { message: format!("{module} created successfully"), data }))
}
