use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::InventoryThresholds;

/// Dental supply category (closed set)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
pub enum Category {
    #[serde(rename = "Implant & Abutment Components")]
    #[strum(serialize = "Implant & Abutment Components")]
    ImplantAbutmentComponents,
    #[serde(rename = "Consumables & Disposables")]
    #[strum(serialize = "Consumables & Disposables")]
    ConsumablesDisposables,
    #[serde(rename = "Impression & Matrix Materials")]
    #[strum(serialize = "Impression & Matrix Materials")]
    ImpressionMatrixMaterials,
    #[serde(rename = "Local Anesthetics & Pharmaceuticals")]
    #[strum(serialize = "Local Anesthetics & Pharmaceuticals")]
    LocalAnestheticsPharmaceuticals,
    #[serde(rename = "Restorative Materials & Bonding Agents")]
    #[strum(serialize = "Restorative Materials & Bonding Agents")]
    RestorativeMaterialsBondingAgents,
    #[serde(rename = "Endodontic & Irrigation Supplies")]
    #[strum(serialize = "Endodontic & Irrigation Supplies")]
    EndodonticIrrigationSupplies,
    #[serde(rename = "Etching, Polishing & Bleaching Agents")]
    #[strum(serialize = "Etching, Polishing & Bleaching Agents")]
    EtchingPolishingBleachingAgents,
    #[serde(rename = "Surgical & Sterilization Supplies")]
    #[strum(serialize = "Surgical & Sterilization Supplies")]
    SurgicalSterilizationSupplies,
    #[serde(rename = "Dental Instruments & Accessories")]
    #[strum(serialize = "Dental Instruments & Accessories")]
    DentalInstrumentsAccessories,
    #[serde(rename = "Cleaning, Disinfection & Maintenance Supplies")]
    #[strum(serialize = "Cleaning, Disinfection & Maintenance Supplies")]
    CleaningDisinfectionMaintenanceSupplies,
    #[serde(rename = "Office & Miscellaneous Supplies")]
    #[strum(serialize = "Office & Miscellaneous Supplies")]
    OfficeMiscellaneousSupplies,
}

impl Category {
    /// All valid category names, comma separated (used in error messages)
    pub fn valid_values() -> String {
        Category::iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Inventory item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Server-assigned identifier
    pub id: Uuid,
    /// Business key, unique across all items
    pub item_id: String,
    pub category: Category,
    pub sub_category: String,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Units currently in stock
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    /// Per-item low-stock threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    pub item_id: String,
    pub category: Category,
    pub sub_category: String,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    /// Calendar date, `YYYY-MM-DD`; must be after `productionDate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<i64>,
    /// 8 to 13 digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Validated partial update.
///
/// Optional attributes use `Option<Option<T>>`: `None` leaves the field
/// untouched, `Some(None)` clears it (client sent `null`).
#[derive(Debug, Clone, Default, PartialEq, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateInventoryItem {
    pub item_id: Option<String>,
    pub category: Option<Category>,
    pub sub_category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub description: Option<Option<String>>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub production_date: Option<Option<NaiveDate>>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub supplier: Option<Option<String>>,
    pub storage_location: Option<Option<String>>,
    pub reorder_level: Option<Option<i64>>,
    pub barcode: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Body of `PATCH /{id}/quantity`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Critical,
    Low,
    InStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Warning,
    Ok,
}

impl InventoryItem {
    /// Build a new record from validated input
    pub fn new(input: CreateInventoryItem) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::now_v7(),
            item_id: input.item_id,
            category: input.category,
            sub_category: input.sub_category,
            brand: input.brand,
            model: input.model,
            description: input.description,
            quantity: input.quantity,
            unit_price: input.unit_price,
            production_date: input.production_date,
            expiry_date: input.expiry_date,
            supplier: input.supplier,
            storage_location: input.storage_location,
            reorder_level: input.reorder_level,
            barcode: input.barcode,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated partial update in memory, as the store would
    pub fn apply_update(&mut self, update: UpdateInventoryItem) {
        if let Some(item_id) = update.item_id {
            self.item_id = item_id;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(sub_category) = update.sub_category {
            self.sub_category = sub_category;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = update.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(production_date) = update.production_date {
            self.production_date = production_date;
        }
        if let Some(expiry_date) = update.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(supplier) = update.supplier {
            self.supplier = supplier;
        }
        if let Some(storage_location) = update.storage_location {
            self.storage_location = storage_location;
        }
        if let Some(reorder_level) = update.reorder_level {
            self.reorder_level = reorder_level;
        }
        if let Some(barcode) = update.barcode {
            self.barcode = barcode;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        self.updated_at = now_millis();
    }

    /// Stock status; an item's own reorder level replaces the global low threshold
    pub fn stock_status(&self, thresholds: &InventoryThresholds) -> StockStatus {
        let low = self.reorder_level.unwrap_or(thresholds.low_stock);
        if self.quantity <= 0 {
            StockStatus::OutOfStock
        } else if self.quantity <= thresholds.critical_stock {
            StockStatus::Critical
        } else if self.quantity <= low {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    /// Whole days from `today` until expiry (negative once expired)
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(today).num_days())
    }

    pub fn expiry_status(
        &self,
        thresholds: &InventoryThresholds,
        today: NaiveDate,
    ) -> Option<ExpiryStatus> {
        self.days_until_expiry(today).map(|days| {
            if days < 0 {
                ExpiryStatus::Expired
            } else if days <= thresholds.expiry_critical_days {
                ExpiryStatus::Critical
            } else if days <= thresholds.expiry_warning_days {
                ExpiryStatus::Warning
            } else {
                ExpiryStatus::Ok
            }
        })
    }
}

/// Item as returned by the API, with derived stock and expiry status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub stock_status: StockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_status: Option<ExpiryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
}

impl InventoryItemView {
    pub fn new(item: InventoryItem, thresholds: &InventoryThresholds, today: NaiveDate) -> Self {
        Self {
            stock_status: item.stock_status(thresholds),
            expiry_status: item.expiry_status(thresholds, today),
            days_until_expiry: item.days_until_expiry(today),
            item,
        }
    }
}

/// Current time truncated to the millisecond precision MongoDB stores
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
