//! Inventory Domain
//!
//! Dental supply inventory backed by MongoDB: CRUD over inventory items,
//! filtered listings, a low-stock report and an expiring-items report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │   Service   │ ──▶ │ Validation │  ← Raw payload checks, all violations at once
//! └──────┬──────┘     └────────────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │ Repository  │ ──▶ │   Query    │  ← Typed parameters → filter documents
//! └──────┬──────┘     └────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, derived status
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_inventory::{
//!     InventoryThresholds, MongoInventoryRepository, InventoryService, handlers,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("dental_inventory");
//!
//! let thresholds = InventoryThresholds::default();
//! let repository = MongoInventoryRepository::new(&db, thresholds);
//! repository.init_indexes().await?;
//!
//! let service = InventoryService::new(repository, thresholds);
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use config::InventoryThresholds;
pub use error::{FieldViolation, InventoryError, InventoryResult};
pub use handlers::ApiDoc;
pub use models::{
    Category, CreateInventoryItem, ExpiryStatus, InventoryItem, InventoryItemView,
    QuantityUpdate, StockStatus, UpdateInventoryItem,
};
pub use mongodb::MongoInventoryRepository;
pub use query::{InventoryFilter, InventoryQuery, ListOptions, SortField, SortOrder};
pub use repository::{InventoryRepository, ItemPage};
pub use service::{InventoryService, ItemList};
