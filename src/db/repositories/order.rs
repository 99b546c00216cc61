use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{order_items, orders};
use crate::models::Order;

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List all orders, oldest first
    pub async fn list(&self) -> Result<Vec<Order>> {
        let models = orders::Entity::find()
            .order_by_asc(orders::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list orders")?;

        Ok(models.into_iter().map(Order::from).collect())
    }

    /// Get a single order by ID
    pub async fn get(&self, order_id: i32) -> Result<Option<Order>> {
        let model = orders::Entity::find_by_id(order_id)
            .one(&self.conn)
            .await
            .context("Failed to query order by ID")?;

        Ok(model.map(Order::from))
    }

    /// Substring search over order number and customer name.
    /// SQLite LIKE is case-insensitive for ASCII, which matches the old API.
    pub async fn search(&self, term: &str) -> Result<Vec<Order>> {
        let models = orders::Entity::find()
            .filter(
                Condition::any()
                    .add(orders::Column::OrderNumber.contains(term))
                    .add(orders::Column::CustomerName.contains(term)),
            )
            .order_by_asc(orders::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to search orders")?;

        Ok(models.into_iter().map(Order::from).collect())
    }

    /// Insert a new order with a server-generated order number and a zero total
    pub async fn insert(
        &self,
        order_number: &str,
        customer_name: &str,
        description: Option<&str>,
    ) -> Result<Order> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = orders::ActiveModel {
            order_number: Set(order_number.to_string()),
            customer_name: Set(customer_name.to_string()),
            description: Set(description.map(ToString::to_string)),
            total_price: Set(0.0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert order")?;

        tracing::info!("Created order {} (ID: {})", model.order_number, model.id);

        Ok(Order::from(model))
    }

    /// Update customer-facing fields. Order number and total are never
    /// client-assigned. Returns None when the order does not exist.
    pub async fn update(
        &self,
        order_id: i32,
        customer_name: &str,
        description: Option<&str>,
    ) -> Result<Option<Order>> {
        let Some(model) = orders::Entity::find_by_id(order_id)
            .one(&self.conn)
            .await
            .context("Failed to query order for update")?
        else {
            return Ok(None);
        };

        let mut active: orders::ActiveModel = model.into();
        active.customer_name = Set(customer_name.to_string());
        active.description = Set(description.map(ToString::to_string));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update order")?;

        Ok(Some(Order::from(model)))
    }

    /// Delete an order and its items. Returns false when the order does not
    /// exist. Items are removed in the same transaction rather than relying on
    /// the driver having foreign keys enabled.
    pub async fn delete(&self, order_id: i32) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        order_items::Entity::delete_many()
            .filter(order_items::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await
            .context("Failed to delete order items")?;

        let result = orders::Entity::delete_by_id(order_id)
            .exec(&txn)
            .await
            .context("Failed to delete order")?;

        txn.commit().await.context("Failed to commit order delete")?;

        if result.rows_affected > 0 {
            tracing::info!("Deleted order {order_id} and its items");
        }

        Ok(result.rows_affected > 0)
    }

    /// Recompute an order's total from its items and persist it.
    /// Returns None when the order does not exist.
    pub async fn recount_total(&self, order_id: i32) -> Result<Option<f64>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let total = recount_order_total(&txn, order_id).await?;

        txn.commit().await.context("Failed to commit total recount")?;

        Ok(total)
    }
}

/// Recompute and persist an order's total price as the sum of its items' line
/// totals. Callers run this inside the same transaction as the item mutation
/// so the order row never disagrees with its items.
pub(crate) async fn recount_order_total<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
) -> Result<Option<f64>> {
    let Some(order) = orders::Entity::find_by_id(order_id)
        .one(conn)
        .await
        .context("Failed to query order for total recount")?
    else {
        return Ok(None);
    };

    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .all(conn)
        .await
        .context("Failed to load order items for total recount")?;

    let total: f64 = items.iter().map(|item| item.total_price).sum();

    let mut active: orders::ActiveModel = order.into();
    active.total_price = Set(total);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    active
        .update(conn)
        .await
        .context("Failed to persist recomputed order total")?;

    Ok(Some(total))
}
