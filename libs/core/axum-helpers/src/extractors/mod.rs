//! Custom extractors for Axum handlers.
//!
//! This module provides reusable extractors that reduce boilerplate
//! and standardize error handling across your API.

pub mod json_object;
pub mod uuid_path;

pub use json_object::JsonObject;
pub use uuid_path::UuidPath;
