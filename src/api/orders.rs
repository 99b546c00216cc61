//! Order endpoints.
//!
//! Handlers only do HTTP and JSON mapping; role checks and business rules
//! live in [`crate::services::OrderService`].

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_order_id, validate_search_term};
use super::{ApiError, AppState, OrderPriceResponse, OrderRequest, StatusResponse};
use crate::models::{Identity, Order};
use crate::services::order_service::{OrderError, OrderInput};

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let msg = err.to_string();
        match err {
            OrderError::NotFound(_) => Self::NotFound(msg),
            OrderError::Forbidden(_) => Self::Forbidden(msg),
            OrderError::Validation(_) => Self::ValidationError(msg),
            OrderError::Unavailable(_) => Self::Infrastructure(msg),
            OrderError::Database(_) => Self::InternalError(msg),
        }
    }
}

/// GET /orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.orders().list_orders(&identity).await?;

    Ok(Json(orders))
}

/// GET /order/{orderId}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
) -> Result<Json<Order>, ApiError> {
    let order_id = validate_order_id(order_id)?;

    let order = state.orders().get_order(&identity, order_id).await?;

    Ok(Json(order))
}

/// GET /orders/search/{searchParam}
/// Substring match over order numbers and customer names.
pub async fn search_orders(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(search_param): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let term = validate_search_term(&search_param)?;

    let orders = state.orders().search_orders(&identity, term).await?;

    Ok(Json(orders))
}

/// GET /order/{orderId}/price
/// Recompute the order total from its items and return it.
pub async fn count_order_price(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderPriceResponse>, ApiError> {
    let order_id = validate_order_id(order_id)?;

    let total_price = state
        .orders()
        .count_total_price(&identity, order_id)
        .await?;

    Ok(Json(OrderPriceResponse {
        order_id,
        total_price,
    }))
}

/// POST /order/add
/// Create an order. ADMIN only. The order number is generated server-side
/// and the total starts at zero.
pub async fn add_order(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<OrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .orders()
        .add_order(
            &identity,
            OrderInput {
                customer_name: payload.customer_name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(order))
}

/// PUT /order/update/{orderId}
/// Update an order's customer-facing fields. ADMIN only.
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
    Json(payload): Json<OrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order_id = validate_order_id(order_id)?;

    let order = state
        .orders()
        .update_order(
            &identity,
            order_id,
            OrderInput {
                customer_name: payload.customer_name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(order))
}

/// PUT /order/delete/{orderId}
/// Delete an order and its items. ADMIN only.
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
) -> Result<Json<StatusResponse>, ApiError> {
    let order_id = validate_order_id(order_id)?;

    state.orders().delete_order(&identity, order_id).await?;

    Ok(Json(StatusResponse::success(format!(
        "order was deleted with ID: {order_id}"
    ))))
}
