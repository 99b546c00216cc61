use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{OrderItemService, OrderService, TokenService, UserService};
use crate::state::SharedState;

pub mod auth;
mod error;
mod items;
mod observability;
mod orders;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.shared.tokens
    }

    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserService> {
        &self.shared.users
    }

    #[must_use]
    pub fn orders(&self) -> &Arc<dyn OrderService> {
        &self.shared.orders
    }

    #[must_use]
    pub fn items(&self) -> &Arc<dyn OrderItemService> {
        &self.shared.items
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    // Token issuance is the one business route reachable without a token
    let api_router = Router::new()
        .merge(protected_routes)
        .route("/user/authenticate", post(users::authenticate));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api/v1", api_router)
        .route("/health", get(observability::get_health))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/user/register", post(users::register))
        .route("/user/change/password", put(users::change_password))
        .route("/user/status", put(users::set_user_status))
        .route("/orders", get(orders::list_orders))
        .route("/order/{orderId}", get(orders::get_order))
        .route("/orders/search/{searchParam}", get(orders::search_orders))
        .route("/order/{orderId}/price", get(orders::count_order_price))
        .route("/order/add", post(orders::add_order))
        .route("/order/update/{orderId}", put(orders::update_order))
        .route("/order/delete/{orderId}", put(orders::delete_order))
        .route("/order/{orderId}/items", get(items::list_items))
        .route("/order/item/{itemId}", get(items::get_item))
        .route(
            "/order/{orderId}/items/search/{itemName}",
            get(items::find_items),
        )
        .route("/order/{orderId}/add/item", post(items::add_item))
        .route("/order/update/item/{itemId}", put(items::update_item))
        .route("/order/delete/item/{itemId}", put(items::delete_item))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
