pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;
pub mod utils;

pub use config::{Config, FieldNaming};
pub use routes::{create_routes, AppState};
pub use store::EventStore;
