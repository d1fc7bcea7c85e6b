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

use super::validation::{validate_percentage_up_to, validate_price};
use super::{created, ApiError, AppState, Created, FieldErrors, ListParams, PaginatedResponse};
use crate::domain::aggregates::{Discount, DiscountKind, DiscountTag};
use crate::domain::value_objects::{Money, Percentage};

const DISCOUNT: &str = "Discount";
const PERCENTAGE_DISCOUNT: &str = "Percentage discount";
const FIXED_AMOUNT_DISCOUNT: &str = "Fixed amount discount";

#[derive(Debug, Serialize)]
pub struct DiscountView {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub kind: DiscountKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Discount> for DiscountView {
    fn from(d: &Discount) -> Self {
        Self { id: d.id(), name: d.name().to_string(), kind: d.kind().clone(), created_at: d.created_at(), updated_at: d.updated_at() }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDiscountRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub name: String,
}

/// The configured cap is checked by the handler, not the derive.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePercentageDiscountRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub name: String,
    pub percentage: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFixedAmountDiscountRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub amount: Decimal,
}

async fn list(
    state: AppState,
    tag: Option<DiscountTag>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<DiscountView>>, ApiError> {
    let Query(params) = params?;
    let page = params.page();
    let listing = state.store.list_discounts(tag, page).await?;
    Ok(Json(PaginatedResponse::from_listing(listing, page, |d| DiscountView::from(d))))
}

async fn save(state: AppState, module: &str, mut discount: Discount) -> Result<(StatusCode, Json<Created<DiscountView>>), ApiError> {
    let events = discount.take_events();
    state.store.create_discount(&discount).await?;
    state.publisher.publish(events).await;
    tracing::info!(discount_id = %discount.id(), kind = discount.kind().tag().as_str(), "discount created");
    Ok(created(module, DiscountView::from(&discount)))
}

pub async fn list_discounts(State(s): State<AppState>, q: Result<Query<ListParams>, QueryRejection>) -> Result<Json<PaginatedResponse<DiscountView>>, ApiError> {
    list(s, None, q).await
}

pub async fn list_percentage_discounts(State(s): State<AppState>, q: Result<Query<ListParams>, QueryRejection>) -> Result<Json<PaginatedResponse<DiscountView>>, ApiError> {
    list(s, Some(DiscountTag::Percentage), q).await
}

pub async fn list_fixed_discounts(State(s): State<AppState>, q: Result<Query<ListParams>, QueryRejection>) -> Result<Json<PaginatedResponse<DiscountView>>, ApiError> {
    list(s, Some(DiscountTag::FixedAmount), q).await
}

pub async fn create_discount(
    State(s): State<AppState>,
    payload: Result<Json<CreateDiscountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<DiscountView>>), ApiError> {
    let Json(r) = payload?;
    r.validate()?;
    save(s, DISCOUNT, Discount::create(r.name, DiscountKind::Base)?).await
}

pub async fn create_percentage_discount(
    State(s): State<AppState>,
    payload: Result<Json<CreatePercentageDiscountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<DiscountView>>), ApiError> {
    let Json(r) = payload?;
    let mut errors = FieldErrors::new();
    if let Err(e) = r.validate() {
        errors.merge("", &e);
    }
    if let Err(e) = validate_percentage_up_to(&r.percentage, s.max_discount.value()) {
        errors.add_error("percentage", &e);
    }
    errors.into_result()?;
    let discount = Discount::percentage(r.name, Percentage::new(r.percentage)?.rounded())?;
    save(s, PERCENTAGE_DISCOUNT, discount).await
}

pub async fn create_fixed_discount(
    State(s): State<AppState>,
    payload: Result<Json<CreateFixedAmountDiscountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<DiscountView>>), ApiError> {
    let Json(r) = payload?;
    r.validate()?;
    let discount = Discount::fixed_amount(r.name, Money::new(r.amount)?.rounded())?;
    save(s, FIXED_AMOUNT_DISCOUNT, discount).await
}
