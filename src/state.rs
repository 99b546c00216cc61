use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    OrderItemService, OrderService, SeaOrmOrderItemService, SeaOrmOrderService, SeaOrmUserService,
    TokenService, UserService,
};

/// Long-lived state shared by every request handler.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub users: Arc<dyn UserService>,

    pub orders: Arc<dyn OrderService>,

    pub items: Arc<dyn OrderItemService>,
}

impl SharedState {
    /// Connect to the database, run migrations, and wire up the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = Arc::new(TokenService::from_config(&config.auth));

        let users = Arc::new(SeaOrmUserService::new(
            store.clone(),
            tokens.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService>;

        let orders = Arc::new(SeaOrmOrderService::new(store.clone())) as Arc<dyn OrderService>;

        let items =
            Arc::new(SeaOrmOrderItemService::new(store.clone())) as Arc<dyn OrderItemService>;

        Ok(Self {
            config,
            store,
            tokens,
            users,
            orders,
            items,
        })
    }
}
