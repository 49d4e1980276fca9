use async_trait::async_trait;
use uuid::Uuid;

use crate::error::InventoryResult;
use crate::models::{CreateInventoryItem, InventoryItem, UpdateInventoryItem};
use crate::query::{InventoryFilter, ListOptions};

/// One page of a filtered listing plus the total number of matches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPage {
    pub items: Vec<InventoryItem>,
    pub total: u64,
}

/// Repository trait for inventory persistence
///
/// Inputs are expected to be validated already. Every failure is reported
/// through `InventoryError`; a duplicate `itemId` is a `Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Insert a new item, assigning `id` and timestamps
    async fn create(&self, input: CreateInventoryItem) -> InventoryResult<InventoryItem>;

    /// Get an item by ID, `NotFound` if absent
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<InventoryItem>;

    /// List matching items, one page at a time
    async fn find_all(
        &self,
        filter: InventoryFilter,
        options: ListOptions,
    ) -> InventoryResult<ItemPage>;

    /// Apply a partial update and return the updated item
    async fn update(&self, id: Uuid, input: UpdateInventoryItem) -> InventoryResult<InventoryItem>;

    /// Set the stock count; negative quantities are rejected before the store is touched
    async fn update_quantity(&self, id: Uuid, quantity: i64) -> InventoryResult<InventoryItem>;

    /// Delete an item permanently
    async fn remove(&self, id: Uuid) -> InventoryResult<()>;

    /// Items at or below `threshold`, or at or below their own reorder level when omitted
    async fn find_low_stock(&self, threshold: Option<i64>) -> InventoryResult<Vec<InventoryItem>>;

    /// Items expiring between today and `days` from now (configured default when omitted)
    async fn find_expiring_items(&self, days: Option<u64>) -> InventoryResult<Vec<InventoryItem>>;
}
