//! Order service adapters.

mod http_order_client;

pub use http_order_client::{HttpOrderClient, OrderClientConfig};
