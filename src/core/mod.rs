//! Core building blocks: configuration, error types, and shared data models.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, Result};
