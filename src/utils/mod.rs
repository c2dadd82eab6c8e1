pub mod ids;

pub use ids::{order_id, payment_id};
