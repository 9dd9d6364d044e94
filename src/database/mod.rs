pub mod manager;
pub mod schema;
pub mod store;
pub mod handlers;

pub use manager::DatabaseManager;
pub use store::SensorStore;
pub use handlers::{run_database_handler, spawn_database_handler, DatabaseClient, DatabaseHandle};
