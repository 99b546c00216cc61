//! Domain service for order items.

use thiserror::Error;

use crate::models::{Identity, OrderItem};
use crate::services::policy::AccessDenied;

/// Errors specific to order-item operations.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Order not found: {0}")]
    OrderNotFound(i32),

    #[error("Order item not found: {0}")]
    NotFound(i32),

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unavailable(&err) {
            Self::Unavailable(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}

/// Client-assignable item fields. The line total is always computed
/// server-side as quantity times unit price.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Domain service trait for order items. Every mutation also refreshes the
/// parent order's total price.
#[async_trait::async_trait]
pub trait OrderItemService: Send + Sync {
    /// Lists the items of one order. Any authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::OrderNotFound`] when the order does not exist.
    async fn list_items(&self, actor: &Identity, order_id: i32)
    -> Result<Vec<OrderItem>, ItemError>;

    /// Gets one item by ID. Any authenticated caller.
    async fn get_item(&self, actor: &Identity, item_id: i32) -> Result<OrderItem, ItemError>;

    /// Substring search over item names within one order. Any authenticated
    /// caller.
    async fn find_items_by_name(
        &self,
        actor: &Identity,
        order_id: i32,
        term: &str,
    ) -> Result<Vec<OrderItem>, ItemError>;

    /// Adds an item to an order. ADMIN only.
    async fn add_item(
        &self,
        actor: &Identity,
        order_id: i32,
        input: ItemInput,
    ) -> Result<OrderItem, ItemError>;

    /// Updates an item. ADMIN only.
    async fn update_item(
        &self,
        actor: &Identity,
        item_id: i32,
        input: ItemInput,
    ) -> Result<OrderItem, ItemError>;

    /// Deletes an item. ADMIN only.
    async fn delete_item(&self, actor: &Identity, item_id: i32) -> Result<(), ItemError>;
}

/// Validate client-assignable item fields
pub fn validate_item_input(input: &ItemInput) -> Result<(), ItemError> {
    if input.name.trim().is_empty() {
        return Err(ItemError::Validation(
            "Item name must not be empty".to_string(),
        ));
    }

    if input.quantity <= 0 {
        return Err(ItemError::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }

    if !input.unit_price.is_finite() || input.unit_price < 0.0 {
        return Err(ItemError::Validation(
            "Unit price must be a non-negative number".to_string(),
        ));
    }

    Ok(())
}
