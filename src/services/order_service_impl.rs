//! `SeaORM` implementation of the `OrderService` trait.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::db::{self, Store};
use crate::models::{Identity, Order};
use crate::services::order_service::{OrderError, OrderInput, OrderService, validate_order_input};
use crate::services::policy::{Operation, authorize};

pub struct SeaOrmOrderService {
    store: Store,
}

impl SeaOrmOrderService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn list_orders(&self, actor: &Identity) -> Result<Vec<Order>, OrderError> {
        authorize(actor, Operation::ReadOrders)?;

        Ok(self.store.list_orders().await?)
    }

    async fn get_order(&self, actor: &Identity, order_id: i32) -> Result<Order, OrderError> {
        authorize(actor, Operation::ReadOrders)?;

        self.store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    async fn search_orders(&self, actor: &Identity, term: &str) -> Result<Vec<Order>, OrderError> {
        authorize(actor, Operation::ReadOrders)?;

        Ok(self.store.search_orders(term).await?)
    }

    async fn add_order(&self, actor: &Identity, input: OrderInput) -> Result<Order, OrderError> {
        authorize(actor, Operation::MutateOrders)?;
        validate_order_input(&input)?;

        // Retry on an order-number collision; the unique index is the backstop
        let mut attempts = 0;
        loop {
            let order_number = generate_order_number();
            match self
                .store
                .insert_order(&order_number, &input.customer_name, input.description.as_deref())
                .await
            {
                Ok(order) => return Ok(order),
                Err(err) if db::is_unique_violation(&err) && attempts < 2 => attempts += 1,
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn update_order(
        &self,
        actor: &Identity,
        order_id: i32,
        input: OrderInput,
    ) -> Result<Order, OrderError> {
        authorize(actor, Operation::MutateOrders)?;
        validate_order_input(&input)?;

        self.store
            .update_order(order_id, &input.customer_name, input.description.as_deref())
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    async fn delete_order(&self, actor: &Identity, order_id: i32) -> Result<(), OrderError> {
        authorize(actor, Operation::MutateOrders)?;

        let deleted = self.store.delete_order(order_id).await?;
        if !deleted {
            return Err(OrderError::NotFound(order_id));
        }

        Ok(())
    }

    async fn count_total_price(
        &self,
        actor: &Identity,
        order_id: i32,
    ) -> Result<f64, OrderError> {
        authorize(actor, Operation::ReadOrders)?;

        self.store
            .recount_order_total(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }
}

/// Build a fresh order number, e.g. `ORD-20260301-1A2B3C`.
/// Uniqueness is enforced by the index on the orders table.
fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();

    format!("ORD-{date}-{suffix}")
}
