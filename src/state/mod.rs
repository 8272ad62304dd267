pub mod store;
pub mod sql_store;
pub mod factory;

pub use store::*;
pub use sql_store::SqlStore;
pub use factory::{create_store, create_in_memory_store};
