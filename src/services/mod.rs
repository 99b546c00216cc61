pub mod policy;
pub use policy::{AccessDenied, Operation, authorize};

pub mod token;
pub use token::{Claims, TokenError, TokenService};

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{NewUser, UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod order_service;
pub mod order_service_impl;
pub use order_service::{OrderError, OrderInput, OrderService};
pub use order_service_impl::SeaOrmOrderService;

pub mod order_item_service;
pub mod order_item_service_impl;
pub use order_item_service::{ItemError, ItemInput, OrderItemService};
pub use order_item_service_impl::SeaOrmOrderItemService;
