use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Uniform body for mutation results and errors:
/// `{"status": "success" | "error", "message": "..."}`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// POST /user/register
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// POST /user/authenticate
#[derive(Debug, Deserialize)]
pub struct AuthenticationRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// PUT /user/change/password. A missing username means the caller's own
/// account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub username: Option<String>,
    pub old_password: String,
    pub new_password: String,
}

/// PUT /user/status
#[derive(Debug, Deserialize)]
pub struct UserStatusRequest {
    pub username: String,
    pub enabled: bool,
}

/// POST /order/add and PUT /order/update/{orderId}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /order/{orderId}/price
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPriceResponse {
    pub order_id: i32,
    pub total_price: f64,
}

/// POST /order/{orderId}/add/item and PUT /order/update/item/{itemId}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// GET /health
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
