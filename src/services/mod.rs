//! Business logic services.

pub mod access;
pub mod auth_service;
pub mod metadata_service;
pub mod record_service;
pub mod user_service;
pub mod validation;
