//! MongoDB implementation of InventoryRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Bson, Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::config::InventoryThresholds;
use crate::error::{InventoryError, InventoryResult};
use crate::models::{Category, CreateInventoryItem, InventoryItem, UpdateInventoryItem};
use crate::query::{self, InventoryFilter, ListOptions};
use crate::repository::{InventoryRepository, ItemPage};

/// Server error code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

/// Stored shape of an item. Dates are kept as `YYYY-MM-DD` strings so range
/// filters compare them in calendar order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryDocument {
    #[serde(rename = "_id")]
    id: String,
    item_id: String,
    category: Category,
    sub_category: String,
    brand: String,
    model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    quantity: i64,
    unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    production_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reorder_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&InventoryItem> for InventoryDocument {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id.to_string(),
            item_id: item.item_id.clone(),
            category: item.category,
            sub_category: item.sub_category.clone(),
            brand: item.brand.clone(),
            model: item.model.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            production_date: item.production_date,
            expiry_date: item.expiry_date,
            supplier: item.supplier.clone(),
            storage_location: item.storage_location.clone(),
            reorder_level: item.reorder_level,
            barcode: item.barcode.clone(),
            notes: item.notes.clone(),
            created_at: bson::DateTime::from_millis(item.created_at.timestamp_millis()),
            updated_at: bson::DateTime::from_millis(item.updated_at.timestamp_millis()),
        }
    }
}

impl TryFrom<InventoryDocument> for InventoryItem {
    type Error = InventoryError;

    fn try_from(doc: InventoryDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&doc.id)
            .map_err(|e| InventoryError::Internal(format!("stored _id '{}': {}", doc.id, e)))?;

        Ok(Self {
            id,
            item_id: doc.item_id,
            category: doc.category,
            sub_category: doc.sub_category,
            brand: doc.brand,
            model: doc.model,
            description: doc.description,
            quantity: doc.quantity,
            unit_price: doc.unit_price,
            production_date: doc.production_date,
            expiry_date: doc.expiry_date,
            supplier: doc.supplier,
            storage_location: doc.storage_location,
            reorder_level: doc.reorder_level,
            barcode: doc.barcode,
            notes: doc.notes,
            created_at: to_chrono(doc.created_at)?,
            updated_at: to_chrono(doc.updated_at)?,
        })
    }
}

fn to_chrono(value: bson::DateTime) -> InventoryResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.timestamp_millis())
        .ok_or_else(|| InventoryError::Internal(format!("stored timestamp out of range: {}", value)))
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn set_optional(set: &mut Document, unset: &mut Document, key: &str, value: Option<Option<Bson>>) {
    match value {
        Some(Some(value)) => {
            set.insert(key, value);
        }
        Some(None) => {
            unset.insert(key, "");
        }
        None => {}
    }
}

/// `$set`/`$unset` update for a partial update; always bumps `updatedAt`
fn update_document(input: &UpdateInventoryItem) -> Document {
    let mut set = doc! {};
    let mut unset = doc! {};

    if let Some(ref item_id) = input.item_id {
        set.insert("itemId", item_id);
    }
    if let Some(category) = input.category {
        set.insert("category", category.to_string());
    }
    if let Some(ref sub_category) = input.sub_category {
        set.insert("subCategory", sub_category);
    }
    if let Some(ref brand) = input.brand {
        set.insert("brand", brand);
    }
    if let Some(ref model) = input.model {
        set.insert("model", model);
    }
    if let Some(quantity) = input.quantity {
        set.insert("quantity", quantity);
    }
    if let Some(unit_price) = input.unit_price {
        set.insert("unitPrice", unit_price);
    }

    let text = |value: &Option<Option<String>>| value.clone().map(|v| v.map(Bson::String));
    let date = |value: &Option<Option<NaiveDate>>| {
        value.map(|v| v.map(|d| Bson::String(d.to_string())))
    };

    set_optional(&mut set, &mut unset, "description", text(&input.description));
    set_optional(&mut set, &mut unset, "productionDate", date(&input.production_date));
    set_optional(&mut set, &mut unset, "expiryDate", date(&input.expiry_date));
    set_optional(&mut set, &mut unset, "supplier", text(&input.supplier));
    set_optional(&mut set, &mut unset, "storageLocation", text(&input.storage_location));
    set_optional(
        &mut set,
        &mut unset,
        "reorderLevel",
        input.reorder_level.map(|v| v.map(Bson::Int64)),
    );
    set_optional(&mut set, &mut unset, "barcode", text(&input.barcode));
    set_optional(&mut set, &mut unset, "notes", text(&input.notes));

    set.insert("updatedAt", bson::DateTime::now());

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

/// MongoDB implementation of the InventoryRepository
pub struct MongoInventoryRepository {
    collection: Collection<InventoryDocument>,
    thresholds: InventoryThresholds,
}

impl MongoInventoryRepository {
    /// Create a repository over the `inventory` collection
    pub fn new(db: &Database, thresholds: InventoryThresholds) -> Self {
        let collection = db.collection::<InventoryDocument>("inventory");
        Self {
            collection,
            thresholds,
        }
    }

    /// Initialize indexes; the unique `itemId` index backs duplicate detection
    pub async fn init_indexes(&self) -> InventoryResult<()> {
        let index = |keys: Document, name: &str, unique: bool, sparse: bool| {
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(unique)
                        .sparse(sparse)
                        .build(),
                )
                .build()
        };

        let indexes = vec![
            index(doc! { "itemId": 1 }, "idx_item_id_unique", true, false),
            index(
                doc! { "category": 1, "subCategory": 1 },
                "idx_category_sub_category",
                false,
                false,
            ),
            index(doc! { "brand": 1 }, "idx_brand", false, false),
            index(doc! { "barcode": 1 }, "idx_barcode", false, true),
            index(doc! { "expiryDate": 1 }, "idx_expiry_date", false, true),
            index(doc! { "createdAt": -1 }, "idx_created_at", false, false),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Inventory indexes created successfully");
        Ok(())
    }

    async fn find_many(
        &self,
        filter: InventoryFilter,
        sort: Document,
    ) -> InventoryResult<Vec<InventoryItem>> {
        let options = FindOptions::builder().sort(sort).build();
        let documents: Vec<InventoryDocument> = self
            .collection
            .find(filter.into_document())
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(InventoryItem::try_from).collect()
    }
}

#[async_trait]
impl InventoryRepository for MongoInventoryRepository {
    #[instrument(skip(self, input), fields(item_id = %input.item_id))]
    async fn create(&self, input: CreateInventoryItem) -> InventoryResult<InventoryItem> {
        let item = InventoryItem::new(input);

        match self.collection.insert_one(InventoryDocument::from(&item)).await {
            Ok(_) => {
                tracing::info!(id = %item.id, "Inventory item created successfully");
                Ok(item)
            }
            Err(e) if is_duplicate_key(&e) => {
                tracing::info!("Duplicate itemId rejected");
                Err(InventoryError::duplicate_item_id(&item.item_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<InventoryItem> {
        self.collection
            .find_one(id_filter(id))
            .await?
            .ok_or(InventoryError::NotFound(id))?
            .try_into()
    }

    #[instrument(skip(self, filter))]
    async fn find_all(
        &self,
        filter: InventoryFilter,
        options: ListOptions,
    ) -> InventoryResult<ItemPage> {
        let filter = filter.into_document();
        let total = self.collection.count_documents(filter.clone()).await?;

        let find_options = FindOptions::builder()
            .sort(options.sort())
            .skip(options.skip())
            .limit(i64::try_from(options.limit).unwrap_or(i64::MAX))
            .build();

        let documents: Vec<InventoryDocument> = self
            .collection
            .find(filter)
            .with_options(find_options)
            .await?
            .try_collect()
            .await?;

        let items = documents
            .into_iter()
            .map(InventoryItem::try_from)
            .collect::<InventoryResult<Vec<_>>>()?;

        Ok(ItemPage { items, total })
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateInventoryItem) -> InventoryResult<InventoryItem> {
        let update = update_document(&input);

        let updated = match self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await
        {
            Ok(updated) => updated,
            Err(e) if is_duplicate_key(&e) => {
                let item_id = input.item_id.as_deref().unwrap_or_default();
                return Err(InventoryError::duplicate_item_id(item_id));
            }
            Err(e) => return Err(e.into()),
        };

        let item: InventoryItem = updated.ok_or(InventoryError::NotFound(id))?.try_into()?;
        tracing::info!(item_id = %item.item_id, "Inventory item updated successfully");
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn update_quantity(&self, id: Uuid, quantity: i64) -> InventoryResult<InventoryItem> {
        if quantity < 0 {
            return Err(InventoryError::InvalidArgument(format!(
                "quantity must be a non-negative integer, got {}",
                quantity
            )));
        }

        let update = doc! {
            "$set": { "quantity": quantity, "updatedAt": bson::DateTime::now() }
        };

        let item: InventoryItem = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(InventoryError::NotFound(id))?
            .try_into()?;

        tracing::info!(item_id = %item.item_id, quantity, "Quantity updated");
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: Uuid) -> InventoryResult<()> {
        let result = self.collection.delete_one(id_filter(id)).await?;

        if result.deleted_count == 0 {
            return Err(InventoryError::NotFound(id));
        }

        tracing::info!(id = %id, "Inventory item deleted successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_low_stock(&self, threshold: Option<i64>) -> InventoryResult<Vec<InventoryItem>> {
        self.find_many(
            query::low_stock_filter(threshold),
            doc! { "quantity": 1, "_id": 1 },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_expiring_items(&self, days: Option<u64>) -> InventoryResult<Vec<InventoryItem>> {
        let days = days.unwrap_or(u64::try_from(self.thresholds.expiry_warning_days).unwrap_or(0));
        let today = Utc::now().date_naive();

        self.find_many(
            query::expiring_filter(today, days),
            doc! { "expiryDate": 1, "_id": 1 },
        )
        .await
    }
}
