use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::order::recount_order_total;
use crate::entities::{order_items, orders};
use crate::models::OrderItem;

pub struct OrderItemRepository {
    conn: DatabaseConnection,
}

impl OrderItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List the items of one order. Returns None when the order does not exist,
    /// so callers can tell an unknown order apart from an empty one.
    pub async fn list_for_order(&self, order_id: i32) -> Result<Option<Vec<OrderItem>>> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.conn)
            .await
            .context("Failed to query order for item listing")?;

        if order.is_none() {
            return Ok(None);
        }

        let models = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list order items")?;

        Ok(Some(models.into_iter().map(OrderItem::from).collect()))
    }

    /// Get a single order item by ID
    pub async fn get(&self, item_id: i32) -> Result<Option<OrderItem>> {
        let model = order_items::Entity::find_by_id(item_id)
            .one(&self.conn)
            .await
            .context("Failed to query order item by ID")?;

        Ok(model.map(OrderItem::from))
    }

    /// Substring search over item names within one order
    pub async fn find_by_name(&self, order_id: i32, term: &str) -> Result<Vec<OrderItem>> {
        let models = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .filter(order_items::Column::Name.contains(term))
            .order_by_asc(order_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to search order items")?;

        Ok(models.into_iter().map(OrderItem::from).collect())
    }

    /// Add an item to an order and refresh the order's total in the same
    /// transaction. Returns None when the order does not exist.
    pub async fn add_to_order(
        &self,
        order_id: i32,
        name: &str,
        quantity: i32,
        unit_price: f64,
    ) -> Result<Option<OrderItem>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let order = orders::Entity::find_by_id(order_id)
            .one(&txn)
            .await
            .context("Failed to query order for item insert")?;

        if order.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().to_rfc3339();

        let active = order_items::ActiveModel {
            order_id: Set(order_id),
            name: Set(name.to_string()),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            total_price: Set(f64::from(quantity) * unit_price),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&txn)
            .await
            .context("Failed to insert order item")?;

        recount_order_total(&txn, order_id).await?;

        txn.commit().await.context("Failed to commit item insert")?;

        tracing::info!(
            "Added item {} to order {} (ID: {})",
            model.name,
            order_id,
            model.id
        );

        Ok(Some(OrderItem::from(model)))
    }

    /// Update an item and refresh the parent order's total in the same
    /// transaction. Returns None when the item does not exist.
    pub async fn update_item(
        &self,
        item_id: i32,
        name: &str,
        quantity: i32,
        unit_price: f64,
    ) -> Result<Option<OrderItem>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let Some(model) = order_items::Entity::find_by_id(item_id)
            .one(&txn)
            .await
            .context("Failed to query order item for update")?
        else {
            return Ok(None);
        };

        let order_id = model.order_id;

        let mut active: order_items::ActiveModel = model.into();
        active.name = Set(name.to_string());
        active.quantity = Set(quantity);
        active.unit_price = Set(unit_price);
        active.total_price = Set(f64::from(quantity) * unit_price);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&txn)
            .await
            .context("Failed to update order item")?;

        recount_order_total(&txn, order_id).await?;

        txn.commit().await.context("Failed to commit item update")?;

        Ok(Some(OrderItem::from(model)))
    }

    /// Delete an item and refresh the parent order's total in the same
    /// transaction. Returns false when the item does not exist.
    pub async fn delete_item(&self, item_id: i32) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let Some(model) = order_items::Entity::find_by_id(item_id)
            .one(&txn)
            .await
            .context("Failed to query order item for delete")?
        else {
            return Ok(false);
        };

        let order_id = model.order_id;

        order_items::Entity::delete_by_id(item_id)
            .exec(&txn)
            .await
            .context("Failed to delete order item")?;

        recount_order_total(&txn, order_id).await?;

        txn.commit().await.context("Failed to commit item delete")?;

        tracing::info!("Deleted order item {item_id} from order {order_id}");

        Ok(true)
    }
}
