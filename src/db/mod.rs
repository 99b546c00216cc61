use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use tracing::info;

use crate::models::{Order, OrderItem, Role, User};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // In-memory databases need no file scaffolding
        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::order::OrderRepository {
        repositories::order::OrderRepository::new(self.conn.clone())
    }

    fn item_repo(&self) -> repositories::order_item::OrderItemRepository {
        repositories::order_item::OrderItemRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_with_hash(&self, username: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_with_hash(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        self.user_repo().insert(username, password_hash, role).await
    }

    pub async fn update_user_password_hash(&self, username: &str, new_hash: &str) -> Result<bool> {
        self.user_repo()
            .update_password_hash(username, new_hash)
            .await
    }

    pub async fn set_user_enabled(&self, username: &str, enabled: bool) -> Result<bool> {
        self.user_repo().set_enabled(username, enabled).await
    }

    // ========== Order Repository Methods ==========

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.order_repo().list().await
    }

    pub async fn get_order(&self, order_id: i32) -> Result<Option<Order>> {
        self.order_repo().get(order_id).await
    }

    pub async fn search_orders(&self, term: &str) -> Result<Vec<Order>> {
        self.order_repo().search(term).await
    }

    pub async fn insert_order(
        &self,
        order_number: &str,
        customer_name: &str,
        description: Option<&str>,
    ) -> Result<Order> {
        self.order_repo()
            .insert(order_number, customer_name, description)
            .await
    }

    pub async fn update_order(
        &self,
        order_id: i32,
        customer_name: &str,
        description: Option<&str>,
    ) -> Result<Option<Order>> {
        self.order_repo()
            .update(order_id, customer_name, description)
            .await
    }

    pub async fn delete_order(&self, order_id: i32) -> Result<bool> {
        self.order_repo().delete(order_id).await
    }

    pub async fn recount_order_total(&self, order_id: i32) -> Result<Option<f64>> {
        self.order_repo().recount_total(order_id).await
    }

    // ========== Order Item Repository Methods ==========

    pub async fn list_order_items(&self, order_id: i32) -> Result<Option<Vec<OrderItem>>> {
        self.item_repo().list_for_order(order_id).await
    }

    pub async fn get_order_item(&self, item_id: i32) -> Result<Option<OrderItem>> {
        self.item_repo().get(item_id).await
    }

    pub async fn find_order_items_by_name(
        &self,
        order_id: i32,
        term: &str,
    ) -> Result<Vec<OrderItem>> {
        self.item_repo().find_by_name(order_id, term).await
    }

    pub async fn add_item_to_order(
        &self,
        order_id: i32,
        name: &str,
        quantity: i32,
        unit_price: f64,
    ) -> Result<Option<OrderItem>> {
        self.item_repo()
            .add_to_order(order_id, name, quantity, unit_price)
            .await
    }

    pub async fn update_order_item(
        &self,
        item_id: i32,
        name: &str,
        quantity: i32,
        unit_price: f64,
    ) -> Result<Option<OrderItem>> {
        self.item_repo()
            .update_item(item_id, name, quantity, unit_price)
            .await
    }

    pub async fn delete_order_item(&self, item_id: i32) -> Result<bool> {
        self.item_repo().delete_item(item_id).await
    }
}

/// True when an error chain bottoms out in a connection-level database
/// failure, i.e. the store itself is unreachable rather than the data being
/// absent or invalid. anyhow keeps the original `DbErr` downcastable through
/// `.context()` layers.
#[must_use]
pub fn is_unavailable(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DbErr>(),
        Some(DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
    )
}

/// True when an error chain bottoms out in a unique-constraint violation,
/// e.g. inserting a username that already exists.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|sql_err| matches!(sql_err, SqlErr::UniqueConstraintViolation(_)))
}
