//! Domain service for orders.

use thiserror::Error;

use crate::models::{Identity, Order};
use crate::services::policy::AccessDenied;

/// Errors specific to order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
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

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unavailable(&err) {
            Self::Unavailable(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}

/// Client-assignable order fields. The order number and total price are
/// always server-controlled.
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub customer_name: String,
    pub description: Option<String>,
}

/// Domain service trait for orders.
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Lists all orders. Any authenticated caller.
    async fn list_orders(&self, actor: &Identity) -> Result<Vec<Order>, OrderError>;

    /// Gets one order by ID. Any authenticated caller.
    async fn get_order(&self, actor: &Identity, order_id: i32) -> Result<Order, OrderError>;

    /// Substring search over order number and customer name. Any
    /// authenticated caller.
    async fn search_orders(&self, actor: &Identity, term: &str) -> Result<Vec<Order>, OrderError>;

    /// Creates an order with a generated order number and a zero total.
    /// ADMIN only.
    async fn add_order(&self, actor: &Identity, input: OrderInput) -> Result<Order, OrderError>;

    /// Updates an order's client-assignable fields. ADMIN only.
    async fn update_order(
        &self,
        actor: &Identity,
        order_id: i32,
        input: OrderInput,
    ) -> Result<Order, OrderError>;

    /// Deletes an order and its items. ADMIN only.
    async fn delete_order(&self, actor: &Identity, order_id: i32) -> Result<(), OrderError>;

    /// Recomputes, persists, and returns the order's total price. Any
    /// authenticated caller.
    async fn count_total_price(&self, actor: &Identity, order_id: i32)
    -> Result<f64, OrderError>;
}

/// Validate client-assignable order fields
pub fn validate_order_input(input: &OrderInput) -> Result<(), OrderError> {
    if input.customer_name.trim().is_empty() {
        return Err(OrderError::Validation(
            "Customer name must not be empty".to_string(),
        ));
    }

    Ok(())
}
