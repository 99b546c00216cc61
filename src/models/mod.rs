pub mod order;
pub mod user;

pub use order::{Order, OrderItem};
pub use user::{Identity, Role, User};
