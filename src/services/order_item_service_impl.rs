//! `SeaORM` implementation of the `OrderItemService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::{Identity, OrderItem};
use crate::services::order_item_service::{
    ItemError, ItemInput, OrderItemService, validate_item_input,
};
use crate::services::policy::{Operation, authorize};

pub struct SeaOrmOrderItemService {
    store: Store,
}

impl SeaOrmOrderItemService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderItemService for SeaOrmOrderItemService {
    async fn list_items(
        &self,
        actor: &Identity,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, ItemError> {
        authorize(actor, Operation::ReadItems)?;

        self.store
            .list_order_items(order_id)
            .await?
            .ok_or(ItemError::OrderNotFound(order_id))
    }

    async fn get_item(&self, actor: &Identity, item_id: i32) -> Result<OrderItem, ItemError> {
        authorize(actor, Operation::ReadItems)?;

        self.store
            .get_order_item(item_id)
            .await?
            .ok_or(ItemError::NotFound(item_id))
    }

    async fn find_items_by_name(
        &self,
        actor: &Identity,
        order_id: i32,
        term: &str,
    ) -> Result<Vec<OrderItem>, ItemError> {
        authorize(actor, Operation::ReadItems)?;

        Ok(self.store.find_order_items_by_name(order_id, term).await?)
    }

    async fn add_item(
        &self,
        actor: &Identity,
        order_id: i32,
        input: ItemInput,
    ) -> Result<OrderItem, ItemError> {
        authorize(actor, Operation::MutateItems)?;
        validate_item_input(&input)?;

        self.store
            .add_item_to_order(order_id, &input.name, input.quantity, input.unit_price)
            .await?
            .ok_or(ItemError::OrderNotFound(order_id))
    }

    async fn update_item(
        &self,
        actor: &Identity,
        item_id: i32,
        input: ItemInput,
    ) -> Result<OrderItem, ItemError> {
        authorize(actor, Operation::MutateItems)?;
        validate_item_input(&input)?;

        self.store
            .update_order_item(item_id, &input.name, input.quantity, input.unit_price)
            .await?
            .ok_or(ItemError::NotFound(item_id))
    }

    async fn delete_item(&self, actor: &Identity, item_id: i32) -> Result<(), ItemError> {
        authorize(actor, Operation::MutateItems)?;

        let deleted = self.store.delete_order_item(item_id).await?;
        if !deleted {
            return Err(ItemError::NotFound(item_id));
        }

        Ok(())
    }
}
