pub mod prelude;

pub mod order_items;
pub mod orders;
pub mod users;
