//! Inventory API routes
//!
//! Wires the inventory domain to the shared MongoDB database.

use axum::Router;
use domain_inventory::{InventoryService, InventoryThresholds, MongoInventoryRepository, handlers};
use mongodb::Database;
use tracing::info;

use crate::state::AppState;

/// Create the inventory router
pub fn router(state: &AppState) -> Router {
    let thresholds = state.config.thresholds;
    let repository = MongoInventoryRepository::new(&state.db, thresholds);
    let service = InventoryService::new(repository, thresholds);

    handlers::router(service)
}

/// Create the inventory collection indexes (unique `itemId` among them)
pub async fn init_indexes(db: &Database, thresholds: InventoryThresholds) -> eyre::Result<()> {
    MongoInventoryRepository::new(db, thresholds)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create inventory indexes: {}", e))?;
    info!("Inventory collection indexes created");
    Ok(())
}
