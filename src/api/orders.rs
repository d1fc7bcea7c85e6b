use std::collections::HashMap;

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::validate_order_total;
use super::{created, ApiError, AppState, Created, FieldErrors, ListParams, PaginatedResponse};
use crate::domain::aggregates::{Order, OrderLine, Product};
use crate::domain::value_objects::{Money, Quantity};
use crate::PricingError;

const ORDER: &str = "Order";

#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub product: Uuid,
    pub quantity: Quantity,
}

#[derive(Debug, Serialize)]
pub struct DiscountRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: Uuid,
    pub total_price: Money,
    pub order_items: Vec<OrderItemView>,
    pub discount: Option<DiscountRef>,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        Self {
            order_id: o.id(),
            total_price: o.total_price(),
            order_items: o.lines().iter().map(|l| OrderItemView { product: l.product.id(), quantity: l.quantity }).collect(),
            discount: o.discount().map(|d| DiscountRef { id: d.id(), name: d.name().to_string() }),
            created_at: o.created_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product: Uuid,
    #[validate(range(min = 1, max = 2147483647, message = "Ensure this value is greater than or equal to 1."))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "This list may not be empty."))]
    pub products: Vec<OrderItemRequest>,
    #[serde(default)]
    pub discount: Option<Uuid>,
}

fn does_not_exist(id: Uuid) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

pub async fn list_orders(
    State(s): State<AppState>,
    q: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<OrderView>>, ApiError> {
    let Query(params) = q?;
    let page = params.page();
    let listing = s.store.list_orders(page).await?;
    Ok(Json(PaginatedResponse::from_listing(listing, page, |o| OrderView::from(o))))
}

/// Resolves the referenced products and discount, prices the order once and stores it.
pub async fn create_order(
    State(s): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<OrderView>>), ApiError> {
    let Json(r) = payload?;

    let mut errors = FieldErrors::new();
    if let Err(e) = r.validate() {
        errors.merge("", &e);
    }
    for (i, item) in r.products.iter().enumerate() {
        if let Err(e) = item.validate() {
            errors.merge(&format!("products[{i}]."), &e);
        }
    }
    errors.into_result()?;

    let ids: Vec<Uuid> = r.products.iter().map(|item| item.product).collect();
    let products: HashMap<Uuid, Product> = s.store.find_products(&ids).await?.into_iter().map(|p| (p.id(), p)).collect();
    let discount = match r.discount {
        Some(id) => s.store.find_discount(id).await?.ok_or(id).map(Some),
        None => Ok(None),
    };

    let mut errors = FieldErrors::new();
    for id in ids.iter().filter(|id| !products.contains_key(*id)) {
        errors.add("products", does_not_exist(*id));
    }
    if let Err(id) = &discount {
        errors.add("discount", does_not_exist(*id));
    }
    errors.into_result()?;
    let discount = discount.unwrap_or(None);

    let lines = r
        .products
        .iter()
        .map(|item| -> Result<OrderLine, PricingError> {
            let quantity = u32::try_from(item.quantity).map_err(|_| PricingError::InvalidQuantity)?;
            let product = products.get(&item.product).cloned().ok_or(PricingError::ProductNotFound(item.product))?;
            Ok(OrderLine::new(product, Quantity::new(quantity)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut order = Order::place(lines, discount)?;
    validate_order_total(&order.total_price()).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.add_error("products", &e);
        ApiError::Validation(errors)
    })?;
    let events = order.take_events();
    s.store.create_order(&order).await?;
    s.publisher.publish(events).await;
    tracing::info!(order_id = %order.id(), total = %order.total_price(), lines = order.lines().len(), "order placed");
    Ok(created(ORDER, OrderView::from(&order)))
}
