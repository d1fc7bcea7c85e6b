use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::{validate_percentage, validate_price};
use super::{created, ApiError, AppState, Created, ListParams, PaginatedResponse};
use crate::domain::aggregates::{PricingRule, Product, ProductKind, DEFAULT_BULK_THRESHOLD};
use crate::domain::value_objects::{Money, Percentage};

const PRODUCT: &str = "Product";
const SEASONAL_PRODUCT: &str = "Seasonal product";
const BULK_PRODUCT: &str = "Bulk product";

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    #[serde(flatten)]
    pub rule: PricingRule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id(), name: p.name().to_string(), price: p.price(), rule: p.rule().clone(),
            created_at: p.created_at(), updated_at: p.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeasonalProductRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_percentage")]
    pub seasonal_discount: Decimal,
}

fn default_bulk_threshold() -> i64 { DEFAULT_BULK_THRESHOLD as i64 }

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBulkProductRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default = "default_bulk_threshold")]
    #[validate(range(min = 0, max = 2147483647, message = "Ensure this value is between 0 and 2147483647."))]
    pub bulk_threshold: i64,
    #[serde(default)]
    #[validate(custom = "validate_percentage")]
    pub bulk_discount: Decimal,
}

async fn list(
    state: AppState,
    kind: Option<ProductKind>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<ProductView>>, ApiError> {
    let Query(params) = params?;
    let page = params.page();
    let listing = state.store.list_products(kind, page).await?;
    Ok(Json(PaginatedResponse::from_listing(listing, page, |p| ProductView::from(p))))
}

async fn save(state: AppState, module: &str, mut product: Product) -> Result<(StatusCode, Json<Created<ProductView>>), ApiError> {
    let events = product.take_events();
    state.store.create_product(&product).await?;
    state.publisher.publish(events).await;
    tracing::info!(product_id = %product.id(), kind = product.kind().as_str(), "product created");
    Ok(created(module, ProductView::from(&product)))
}

pub async fn list_products(State(s): State<AppState>, q: Result<Query<ListParams>, QueryRejection>) -> Result<Json<PaginatedResponse<ProductView>>, ApiError> {
    list(s, None, q).await
}

pub async fn list_seasonal_products(State(s): State<AppState>, q: Result<Query<ListParams>, QueryRejection>) -> Result<Json<PaginatedResponse<ProductView>>, ApiError> {
    list(s, Some(ProductKind::Seasonal), q).await
}

pub async fn list_bulk_products(State(s): State<AppState>, q: Result<Query<ListParams>, QueryRejection>) -> Result<Json<PaginatedResponse<ProductView>>, ApiError> {
    list(s, Some(ProductKind::Bulk), q).await
}

pub async fn create_product(
    State(s): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<ProductView>>), ApiError> {
    let Json(r) = payload?;
    r.validate()?;
    let product = Product::plain(r.name, Money::new(r.price)?.rounded())?;
    save(s, PRODUCT, product).await
}

pub async fn create_seasonal_product(
    State(s): State<AppState>,
    payload: Result<Json<CreateSeasonalProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<ProductView>>), ApiError> {
    let Json(r) = payload?;
    r.validate()?;
    let product = Product::seasonal(r.name, Money::new(r.price)?.rounded(), Percentage::new(r.seasonal_discount)?.rounded())?;
    save(s, SEASONAL_PRODUCT, product).await
}

pub async fn create_bulk_product(
    State(s): State<AppState>,
    payload: Result<Json<CreateBulkProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<ProductView>>), ApiError> {
    let Json(r) = payload?;
    r.validate()?;
    let threshold = u32::try_from(r.bulk_threshold).map_err(|_| ApiError::field("bulk_threshold", "Ensure this value is between 0 and 2147483647."))?;
    let product = Product::bulk(r.name, Money::new(r.price)?.rounded(), threshold, Percentage::new(r.bulk_discount)?.rounded())?;
    save(s, BULK_PRODUCT, product).await
}
