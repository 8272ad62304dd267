//! Product catalog service keeping an OpenSearch index in step with a
//! relational catalog store.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
