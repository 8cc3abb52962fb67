pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod hydrate;
pub mod symbol;

pub use error::{AppError, Result};
