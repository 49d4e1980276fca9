//! Translation of list/report parameters into MongoDB filter documents.
//!
//! Only typed parameters reach this module, so a filter can never carry
//! operators supplied by the client. Nothing here touches the store.

use chrono::{Datelike, Days, NaiveDate};
use mongodb::bson::{Document, doc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::config::InventoryThresholds;
use crate::models::Category;

/// Query parameters accepted by `GET /`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    /// Exact category name
    pub category: Option<Category>,
    pub sub_category: Option<String>,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    /// Inclusive lower bound on quantity
    pub min_quantity: Option<i64>,
    /// Inclusive upper bound on quantity
    pub max_quantity: Option<i64>,
    /// Inclusive upper bound on expiry date (YYYY-MM-DD)
    pub expiring_before: Option<NaiveDate>,
    /// Inclusive lower bound on expiry date (YYYY-MM-DD)
    pub expiring_after: Option<NaiveDate>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Page size
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    ItemId,
    Category,
    Brand,
    Quantity,
    UnitPrice,
    ExpiryDate,
}

impl SortField {
    /// Stored field name
    fn key(self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::ItemId => "itemId",
            SortField::Category => "category",
            SortField::Brand => "brand",
            SortField::Quantity => "quantity",
            SortField::UnitPrice => "unitPrice",
            SortField::ExpiryDate => "expiryDate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Opaque store-level filter produced by the builders below
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryFilter(Document);

impl InventoryFilter {
    pub fn into_document(self) -> Document {
        self.0
    }
}

/// Build the list filter; absent parameters add no constraint.
pub fn build_filter(query: &InventoryQuery) -> InventoryFilter {
    let mut filter = doc! {};

    if let Some(category) = query.category {
        filter.insert("category", category.to_string());
    }
    if let Some(ref sub_category) = query.sub_category {
        filter.insert("subCategory", sub_category);
    }
    if let Some(ref brand) = query.brand {
        filter.insert("brand", brand);
    }
    if let Some(ref supplier) = query.supplier {
        filter.insert("supplier", supplier);
    }

    if query.min_quantity.is_some() || query.max_quantity.is_some() {
        let mut quantity = doc! {};
        if let Some(min) = query.min_quantity {
            quantity.insert("$gte", min);
        }
        if let Some(max) = query.max_quantity {
            quantity.insert("$lte", max);
        }
        filter.insert("quantity", quantity);
    }

    if query.expiring_after.is_some() || query.expiring_before.is_some() {
        let mut expiry = doc! {};
        if let Some(after) = query.expiring_after {
            expiry.insert("$gte", date_key(after));
        }
        if let Some(before) = query.expiring_before {
            expiry.insert("$lte", date_key(before));
        }
        filter.insert("expiryDate", expiry);
    }

    InventoryFilter(filter)
}

/// Low-stock filter.
///
/// With a threshold: `quantity <= threshold`. Without one: `quantity <= reorderLevel`,
/// skipping items that have no reorder level.
pub fn low_stock_filter(threshold: Option<i64>) -> InventoryFilter {
    let filter = match threshold {
        Some(threshold) => doc! { "quantity": { "$lte": threshold } },
        None => doc! {
            "reorderLevel": { "$type": "number" },
            "$expr": { "$lte": ["$quantity", "$reorderLevel"] },
        },
    };
    InventoryFilter(filter)
}

/// Items expiring within `[today, today + days]`, both ends inclusive
pub fn expiring_filter(today: NaiveDate, days: u64) -> InventoryFilter {
    let until = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    InventoryFilter(doc! {
        "expiryDate": {
            "$gte": date_key(today),
            "$lte": date_key(until),
        }
    })
}

/// Comparison key for a stored `expiryDate`.
///
/// Dates are stored as `YYYY-MM-DD` strings, which only sort in calendar
/// order while the year has four digits, so bounds outside 0000-9999 are
/// pinned to the ends of that range.
fn date_key(date: NaiveDate) -> String {
    match date.year() {
        year if year > 9999 => "9999-12-31".to_string(),
        year if year < 0 => "0000-01-01".to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Resolved pagination and ordering for a list call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u64,
    pub limit: u64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ListOptions {
    /// Page defaults to 1; limit defaults to the configured page size and is
    /// clamped to `[1, max_page_limit]`.
    pub fn from_query(query: &InventoryQuery, thresholds: &InventoryThresholds) -> Self {
        Self {
            page: query.page.unwrap_or(1).max(1),
            limit: query
                .limit
                .unwrap_or(thresholds.default_page_limit)
                .clamp(1, thresholds.max_page_limit.max(1)),
            sort_by: query.sort_by.unwrap_or_default(),
            sort_order: query.sort_order.unwrap_or_default(),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Sort document with `_id` as a stable tiebreaker
    pub fn sort(&self) -> Document {
        let direction = match self.sort_order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        let mut sort = Document::new();
        sort.insert(self.sort_by.key(), direction);
        sort.insert("_id", direction);
        sort
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::from_query(&InventoryQuery::default(), &InventoryThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_build_filter_empty() {
        let filter = build_filter(&InventoryQuery::default());
        assert!(filter.into_document().is_empty());
    }

    #[test]
    fn test_build_filter_exact_matches() {
        let query = InventoryQuery {
            category: Some(Category::ConsumablesDisposables),
            sub_category: Some("Gloves".to_string()),
            brand: Some("Kerr".to_string()),
            supplier: Some("Henry Schein".to_string()),
            ..Default::default()
        };
        let filter = build_filter(&query).into_document();
        assert_eq!(
            filter,
            doc! {
                "category": "Consumables & Disposables",
                "subCategory": "Gloves",
                "brand": "Kerr",
                "supplier": "Henry Schein",
            }
        );
    }

    #[test]
    fn test_build_filter_single_bound_ranges() {
        let query = InventoryQuery {
            min_quantity: Some(3),
            expiring_before: Some(date("2026-06-30")),
            ..Default::default()
        };
        let filter = build_filter(&query).into_document();
        assert_eq!(filter.get_document("quantity").unwrap(), &doc! { "$gte": 3_i64 });
        assert_eq!(
            filter.get_document("expiryDate").unwrap(),
            &doc! { "$lte": "2026-06-30" }
        );
    }

    #[test]
    fn test_build_filter_full_ranges() {
        let query = InventoryQuery {
            min_quantity: Some(0),
            max_quantity: Some(10),
            expiring_after: Some(date("2026-01-01")),
            expiring_before: Some(date("2026-12-31")),
            ..Default::default()
        };
        let filter = build_filter(&query).into_document();
        assert_eq!(
            filter.get_document("quantity").unwrap(),
            &doc! { "$gte": 0_i64, "$lte": 10_i64 }
        );
        assert_eq!(
            filter.get_document("expiryDate").unwrap(),
            &doc! { "$gte": "2026-01-01", "$lte": "2026-12-31" }
        );
    }

    #[test]
    fn test_low_stock_filter() {
        let explicit = low_stock_filter(Some(5)).into_document();
        assert_eq!(explicit, doc! { "quantity": { "$lte": 5_i64 } });

        let by_reorder_level = low_stock_filter(None).into_document();
        assert!(by_reorder_level.contains_key("$expr"));
        assert_eq!(
            by_reorder_level.get_document("reorderLevel").unwrap(),
            &doc! { "$type": "number" }
        );
    }

    #[test]
    fn test_expiring_filter_is_inclusive_window() {
        let filter = expiring_filter(date("2026-03-01"), 30).into_document();
        assert_eq!(
            filter,
            doc! { "expiryDate": { "$gte": "2026-03-01", "$lte": "2026-03-31" } }
        );
    }

    #[test]
    fn test_expiring_filter_far_window_still_covers_tomorrow() {
        let today = date("2026-10-19");
        for days in [3_000_000, u64::from(u32::MAX), u64::MAX] {
            let filter = expiring_filter(today, days).into_document();
            let expiry = filter.get_document("expiryDate").unwrap();
            let from = expiry.get_str("$gte").unwrap();
            let until = expiry.get_str("$lte").unwrap();

            assert_eq!(from, "2026-10-19");
            assert_eq!(until, "9999-12-31", "days = {}", days);
            assert!(from <= "2026-10-20" && "2026-10-20" <= until);
        }
    }

    #[test]
    fn test_build_filter_pins_out_of_range_years() {
        let query = InventoryQuery {
            expiring_after: NaiveDate::from_ymd_opt(-5, 1, 1),
            expiring_before: NaiveDate::from_ymd_opt(10240, 7, 9),
            ..Default::default()
        };
        let filter = build_filter(&query).into_document();
        assert_eq!(
            filter,
            doc! { "expiryDate": { "$gte": "0000-01-01", "$lte": "9999-12-31" } }
        );
    }

    #[test]
    fn test_build_filter_pads_early_years() {
        let query = InventoryQuery {
            expiring_before: NaiveDate::from_ymd_opt(812, 3, 4),
            ..Default::default()
        };
        let filter = build_filter(&query).into_document();
        assert_eq!(filter, doc! { "expiryDate": { "$lte": "0812-03-04" } });
    }

    #[test]
    fn test_list_options_defaults_and_clamping() {
        let thresholds = InventoryThresholds::default();
        let options = ListOptions::default();
        assert_eq!(options.page, 1);
        assert_eq!(options.limit, 10);
        assert_eq!(options.skip(), 0);
        assert_eq!(options.sort(), doc! { "createdAt": -1, "_id": -1 });

        let query = InventoryQuery {
            page: Some(0),
            limit: Some(5_000),
            sort_by: Some(SortField::UnitPrice),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let options = ListOptions::from_query(&query, &thresholds);
        assert_eq!(options.page, 1);
        assert_eq!(options.limit, 100);
        assert_eq!(options.sort(), doc! { "unitPrice": 1, "_id": 1 });

        let query = InventoryQuery {
            page: Some(3),
            limit: Some(0),
            ..Default::default()
        };
        let options = ListOptions::from_query(&query, &thresholds);
        assert_eq!(options.limit, 1);
        assert_eq!(options.skip(), 2);
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let query: InventoryQuery = serde_json::from_value(serde_json::json!({
            "category": "Office & Miscellaneous Supplies",
            "minQuantity": 2,
            "expiringBefore": "2026-05-01",
            "sortBy": "expiryDate",
            "sortOrder": "asc"
        }))
        .unwrap();
        assert_eq!(query.category, Some(Category::OfficeMiscellaneousSupplies));
        assert_eq!(query.min_quantity, Some(2));
        assert_eq!(query.sort_by, Some(SortField::ExpiryDate));
        assert_eq!(query.sort_order, Some(SortOrder::Asc));
    }
}
