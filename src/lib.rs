//! Geometa Catalog - Backend Library
//!
//! Metadata catalog API for geospatial datasets (ISO 19115-style records).

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
