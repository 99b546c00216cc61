//! Order-item endpoints.
//!
//! Deletion goes over PUT rather than DELETE for wire compatibility with the
//! API this service replaces.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_item_id, validate_order_id, validate_search_term};
use super::{ApiError, AppState, OrderItemRequest, StatusResponse};
use crate::models::{Identity, OrderItem};
use crate::services::order_item_service::{ItemError, ItemInput};

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        let msg = err.to_string();
        match err {
            ItemError::OrderNotFound(_) | ItemError::NotFound(_) => Self::NotFound(msg),
            ItemError::Forbidden(_) => Self::Forbidden(msg),
            ItemError::Validation(_) => Self::ValidationError(msg),
            ItemError::Unavailable(_) => Self::Infrastructure(msg),
            ItemError::Database(_) => Self::InternalError(msg),
        }
    }
}

/// GET /order/{orderId}/items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
) -> Result<Json<Vec<OrderItem>>, ApiError> {
    let order_id = validate_order_id(order_id)?;

    let items = state.items().list_items(&identity, order_id).await?;

    Ok(Json(items))
}

/// GET /order/item/{itemId}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(item_id): Path<i32>,
) -> Result<Json<OrderItem>, ApiError> {
    let item_id = validate_item_id(item_id)?;

    let item = state.items().get_item(&identity, item_id).await?;

    Ok(Json(item))
}

/// GET /order/{orderId}/items/search/{itemName}
/// Substring match over item names within one order.
pub async fn find_items(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path((order_id, item_name)): Path<(i32, String)>,
) -> Result<Json<Vec<OrderItem>>, ApiError> {
    let order_id = validate_order_id(order_id)?;
    let term = validate_search_term(&item_name)?;

    let items = state
        .items()
        .find_items_by_name(&identity, order_id, term)
        .await?;

    Ok(Json(items))
}

/// POST /order/{orderId}/add/item
/// Add an item to an order and refresh the order's total. ADMIN only.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
    Json(payload): Json<OrderItemRequest>,
) -> Result<Json<OrderItem>, ApiError> {
    let order_id = validate_order_id(order_id)?;

    let item = state
        .items()
        .add_item(
            &identity,
            order_id,
            ItemInput {
                name: payload.name,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
            },
        )
        .await?;

    Ok(Json(item))
}

/// PUT /order/update/item/{itemId}
/// Update an item and refresh the parent order's total. ADMIN only.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(item_id): Path<i32>,
    Json(payload): Json<OrderItemRequest>,
) -> Result<Json<OrderItem>, ApiError> {
    let item_id = validate_item_id(item_id)?;

    let item = state
        .items()
        .update_item(
            &identity,
            item_id,
            ItemInput {
                name: payload.name,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
            },
        )
        .await?;

    Ok(Json(item))
}

/// PUT /order/delete/item/{itemId}
/// Delete an item and refresh the parent order's total. ADMIN only.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(item_id): Path<i32>,
) -> Result<Json<StatusResponse>, ApiError> {
    let item_id = validate_item_id(item_id)?;

    state.items().delete_item(&identity, item_id).await?;

    Ok(Json(StatusResponse::success(format!(
        "order item was deleted with ID: {item_id}"
    ))))
}
