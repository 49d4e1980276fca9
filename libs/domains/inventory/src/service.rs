//! Inventory Service - Business logic layer

use std::sync::Arc;

use axum_helpers::PaginationMeta;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::config::InventoryThresholds;
use crate::error::{InventoryError, InventoryResult};
use crate::models::{InventoryItem, InventoryItemView};
use crate::query::{InventoryQuery, ListOptions, build_filter};
use crate::repository::InventoryRepository;
use crate::validation::{check_date_order, validate_create, validate_quantity, validate_update};

/// A page of items with its pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct ItemList {
    pub items: Vec<InventoryItemView>,
    pub pagination: PaginationMeta,
}

/// Inventory service
///
/// Validates raw payloads, enforces invariants that span the stored record,
/// then delegates to the repository. Returned items carry derived stock and
/// expiry status.
pub struct InventoryService<R: InventoryRepository> {
    repository: Arc<R>,
    thresholds: InventoryThresholds,
}

impl<R: InventoryRepository> InventoryService<R> {
    pub fn new(repository: R, thresholds: InventoryThresholds) -> Self {
        Self {
            repository: Arc::new(repository),
            thresholds,
        }
    }

    fn view(&self, item: InventoryItem) -> InventoryItemView {
        InventoryItemView::new(item, &self.thresholds, Utc::now().date_naive())
    }

    fn views(&self, items: Vec<InventoryItem>) -> Vec<InventoryItemView> {
        let today = Utc::now().date_naive();
        items
            .into_iter()
            .map(|item| InventoryItemView::new(item, &self.thresholds, today))
            .collect()
    }

    /// Validate and store a new item
    #[instrument(skip(self, payload))]
    pub async fn create_item(
        &self,
        payload: &Map<String, Value>,
    ) -> InventoryResult<InventoryItemView> {
        let input = validate_create(payload).map_err(InventoryError::Validation)?;
        let item = self.repository.create(input).await?;
        Ok(self.view(item))
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> InventoryResult<InventoryItemView> {
        let item = self.repository.find_by_id(id).await?;
        Ok(self.view(item))
    }

    /// Filtered, sorted, paginated listing
    #[instrument(skip(self))]
    pub async fn list_items(&self, query: InventoryQuery) -> InventoryResult<ItemList> {
        let options = ListOptions::from_query(&query, &self.thresholds);
        let page = self
            .repository
            .find_all(build_filter(&query), options)
            .await?;

        Ok(ItemList {
            items: self.views(page.items),
            pagination: PaginationMeta::new(page.total, options.page, options.limit),
        })
    }

    /// Partial update; date ordering is re-checked against the merged record
    #[instrument(skip(self, payload))]
    pub async fn update_item(
        &self,
        id: Uuid,
        payload: &Map<String, Value>,
    ) -> InventoryResult<InventoryItemView> {
        let input = validate_update(payload).map_err(InventoryError::Validation)?;

        if input.production_date.is_some() || input.expiry_date.is_some() {
            let mut merged = self.repository.find_by_id(id).await?;
            merged.apply_update(input.clone());
            check_date_order(merged.production_date, merged.expiry_date)
                .map_err(|violation| InventoryError::Validation(vec![violation]))?;
        }

        let item = self.repository.update(id, input).await?;
        Ok(self.view(item))
    }

    /// Set the stock count from a `{ "quantity": n }` body
    #[instrument(skip(self, payload))]
    pub async fn update_quantity(
        &self,
        id: Uuid,
        payload: &Map<String, Value>,
    ) -> InventoryResult<InventoryItemView> {
        let quantity = validate_quantity(payload).map_err(InventoryError::Validation)?;
        let item = self.repository.update_quantity(id, quantity).await?;
        Ok(self.view(item))
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: Uuid) -> InventoryResult<()> {
        self.repository.remove(id).await
    }

    /// Low-stock report; see `InventoryRepository::find_low_stock`
    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        threshold: Option<i64>,
    ) -> InventoryResult<Vec<InventoryItemView>> {
        let items = self.repository.find_low_stock(threshold).await?;
        Ok(self.views(items))
    }

    /// Items expiring within `days` (configured warning window by default)
    #[instrument(skip(self))]
    pub async fn expiring_items(
        &self,
        days: Option<u64>,
    ) -> InventoryResult<Vec<InventoryItemView>> {
        let items = self.repository.find_expiring_items(days).await?;
        Ok(self.views(items))
    }
}

impl<R: InventoryRepository> Clone for InventoryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            thresholds: self.thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CreateInventoryItem, StockStatus};
    use crate::repository::{ItemPage, MockInventoryRepository};
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn create_payload() -> Map<String, Value> {
        object(json!({
            "itemId": "IMP-001",
            "category": "Implant & Abutment Components",
            "subCategory": "Abutments",
            "brand": "Nobel Biocare",
            "model": "Multi-unit",
            "quantity": 10,
            "unitPrice": 150
        }))
    }

    fn stored(production: Option<NaiveDate>, expiry: Option<NaiveDate>) -> InventoryItem {
        let mut item = InventoryItem::new(CreateInventoryItem {
            item_id: "LA-100".to_string(),
            category: Category::LocalAnestheticsPharmaceuticals,
            sub_category: "Articaine".to_string(),
            brand: "Septodont".to_string(),
            model: "Septanest".to_string(),
            description: None,
            quantity: 2,
            unit_price: 45.0,
            production_date: None,
            expiry_date: None,
            supplier: None,
            storage_location: None,
            reorder_level: None,
            barcode: None,
            notes: None,
        });
        item.production_date = production;
        item.expiry_date = expiry;
        item
    }

    fn service(mock_repo: MockInventoryRepository) -> InventoryService<MockInventoryRepository> {
        InventoryService::new(mock_repo, InventoryThresholds::default())
    }

    #[tokio::test]
    async fn test_create_item_stores_validated_input() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_create()
            .withf(|input| input.item_id == "IMP-001" && input.quantity == 10)
            .times(1)
            .returning(|input| Ok(InventoryItem::new(input)));

        let view = service(mock_repo).create_item(&create_payload()).await.unwrap();

        assert_eq!(view.item.brand, "Nobel Biocare");
        assert_eq!(view.stock_status, StockStatus::InStock);
        assert_eq!(view.expiry_status, None);
    }

    #[tokio::test]
    async fn test_create_item_with_missing_field_never_reaches_store() {
        for field in ["itemId", "category", "brand", "quantity", "unitPrice"] {
            let mut mock_repo = MockInventoryRepository::new();
            mock_repo.expect_create().never();

            let mut payload = create_payload();
            payload.remove(field);

            let err = service(mock_repo).create_item(&payload).await.unwrap_err();
            match err {
                InventoryError::Validation(violations) => {
                    assert_eq!(violations.len(), 1);
                    assert_eq!(violations[0].field, field);
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_create_item_surfaces_conflict() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_create()
            .returning(|input| Err(InventoryError::duplicate_item_id(&input.item_id)));

        let err = service(mock_repo).create_item(&create_payload()).await.unwrap_err();
        assert!(matches!(err, InventoryError::Conflict(msg) if msg.contains("IMP-001")));
    }

    #[tokio::test]
    async fn test_get_item_not_found() {
        let mut mock_repo = MockInventoryRepository::new();
        let id = Uuid::now_v7();
        mock_repo
            .expect_find_by_id()
            .with(eq(id))
            .returning(|id| Err(InventoryError::NotFound(id)));

        let err = service(mock_repo).get_item(id).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_list_items_builds_pagination() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_find_all()
            .withf(|filter, options| {
                *filter
                    == build_filter(&InventoryQuery {
                        brand: Some("Septodont".to_string()),
                        ..Default::default()
                    })
                    && options.page == 2
                    && options.limit == 10
            })
            .returning(|_, _| {
                Ok(ItemPage {
                    items: vec![stored(None, None)],
                    total: 21,
                })
            });

        let query = InventoryQuery {
            brand: Some("Septodont".to_string()),
            page: Some(2),
            ..Default::default()
        };
        let list = service(mock_repo).list_items(query).await.unwrap();

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].stock_status, StockStatus::Critical);
        assert_eq!(list.pagination, PaginationMeta::new(21, 2, 10));
        assert_eq!(list.pagination.pages, 3);
    }

    #[tokio::test]
    async fn test_update_item_rechecks_dates_against_stored_record() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(id))
            .returning(|_| Ok(stored(NaiveDate::from_ymd_opt(2026, 1, 1), None)));
        mock_repo.expect_update().never();

        let payload = object(json!({ "expiryDate": "2025-12-01" }));
        let err = service(mock_repo).update_item(id, &payload).await.unwrap_err();

        match err {
            InventoryError::Validation(violations) => {
                assert_eq!(violations[0].field, "expiryDate");
                assert_eq!(violations[0].reason, "expiryDate must be after productionDate");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_item_clearing_production_date_skips_order_check() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_find_by_id().returning(|_| {
            Ok(stored(
                NaiveDate::from_ymd_opt(2026, 1, 1),
                NaiveDate::from_ymd_opt(2027, 1, 1),
            ))
        });
        mock_repo
            .expect_update()
            .withf(|_, input| input.production_date == Some(None))
            .times(1)
            .returning(|_, _| Ok(stored(None, NaiveDate::from_ymd_opt(2027, 1, 1))));

        let payload = object(json!({ "productionDate": null }));
        let view = service(mock_repo).update_item(id, &payload).await.unwrap();
        assert_eq!(view.item.production_date, None);
    }

    #[tokio::test]
    async fn test_update_item_without_dates_skips_lookup() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_find_by_id().never();
        mock_repo
            .expect_update()
            .withf(|_, input| input.brand.as_deref() == Some("Septodont Inc"))
            .returning(|_, _| Ok(stored(None, None)));

        let payload = object(json!({ "brand": "Septodont Inc" }));
        assert!(service(mock_repo).update_item(id, &payload).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_item_invalid_payload_never_reaches_store() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_find_by_id().never();
        mock_repo.expect_update().never();

        let err = service(mock_repo)
            .update_item(Uuid::now_v7(), &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_quantity_requires_integer_body() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_update_quantity().never();

        let payload = object(json!({ "quantity": "many" }));
        let err = service(mock_repo)
            .update_quantity(Uuid::now_v7(), &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_quantity_passes_value_through() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_update_quantity()
            .with(eq(id), eq(0_i64))
            .returning(|_, quantity| {
                let mut item = stored(None, None);
                item.quantity = quantity;
                Ok(item)
            });

        let payload = object(json!({ "quantity": 0 }));
        let view = service(mock_repo).update_quantity(id, &payload).await.unwrap();
        assert_eq!(view.stock_status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_reports_forward_arguments() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_find_low_stock()
            .with(eq(None::<i64>))
            .returning(|_| Ok(vec![]));
        mock_repo
            .expect_find_expiring_items()
            .with(eq(Some(14_u64)))
            .returning(|_| Ok(vec![stored(None, None)]));

        let service = service(mock_repo);
        assert!(service.low_stock(None).await.unwrap().is_empty());
        assert_eq!(service.expiring_items(Some(14)).await.unwrap().len(), 1);
    }
}
