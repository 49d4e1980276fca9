//! HTTP handlers for the Inventory API

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    ApiResponse, JsonObject, PaginatedResponse, PaginationMeta, UuidPath,
    errors::responses::{
        BadRequestArgumentResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    Category, CreateInventoryItem, ExpiryStatus, InventoryItem, InventoryItemView,
    QuantityUpdate, StockStatus, UpdateInventoryItem,
};
use crate::query::{InventoryQuery, SortField, SortOrder};
use crate::repository::InventoryRepository;
use crate::service::InventoryService;

/// OpenAPI documentation for the Inventory API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_items,
        create_item,
        low_stock,
        expiring_items,
        get_item,
        update_item,
        update_quantity,
        delete_item,
    ),
    components(
        schemas(
            InventoryItem, InventoryItemView, CreateInventoryItem, UpdateInventoryItem,
            QuantityUpdate, Category, StockStatus, ExpiryStatus, SortField, SortOrder,
            PaginationMeta
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            BadRequestArgumentResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Inventory", description = "Dental supply inventory endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = State<Arc<InventoryService<R>>>;

/// Create the inventory router with all HTTP endpoints
pub fn router<R: InventoryRepository + 'static>(service: InventoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(low_stock))
        .route("/expiring", get(expiring_items))
        .route(
            "/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/{id}/quantity", patch(update_quantity))
        .with_state(shared_service)
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> InventoryResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| InventoryError::InvalidArgument(rejection.body_text()))
}

/// List items with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Inventory",
    params(InventoryQuery),
    responses(
        (status = 200, description = "Page of items with pagination metadata", body = Vec<InventoryItemView>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_items<R: InventoryRepository>(
    State(service): SharedService<R>,
    query: Result<Query<InventoryQuery>, QueryRejection>,
) -> InventoryResult<PaginatedResponse<InventoryItemView>> {
    let list = service.list_items(query_params(query)?).await?;
    Ok(PaginatedResponse::new(list.items, list.pagination))
}

/// Create a new item
#[utoipa::path(
    post,
    path = "",
    tag = "Inventory",
    request_body = CreateInventoryItem,
    responses(
        (status = 201, description = "Item created", body = InventoryItemView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_item<R: InventoryRepository>(
    State(service): SharedService<R>,
    JsonObject(payload): JsonObject,
) -> InventoryResult<impl IntoResponse> {
    let item = service.create_item(&payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(item)))
}

/// Low-stock report query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    /// Report items with quantity at or below this value; when omitted each
    /// item is compared against its own reorder level
    pub threshold: Option<u32>,
}

/// Items at or below a stock threshold
#[utoipa::path(
    get,
    path = "/low-stock",
    tag = "Inventory",
    params(LowStockQuery),
    responses(
        (status = 200, description = "Low-stock items, lowest quantity first", body = Vec<InventoryItemView>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn low_stock<R: InventoryRepository>(
    State(service): SharedService<R>,
    query: Result<Query<LowStockQuery>, QueryRejection>,
) -> InventoryResult<ApiResponse<Vec<InventoryItemView>>> {
    let threshold = query_params(query)?.threshold.map(i64::from);
    let items = service.low_stock(threshold).await?;
    Ok(ApiResponse::new(items))
}

/// Expiring report query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiringQuery {
    /// Forward window in days (defaults to the configured warning window)
    pub days: Option<u32>,
}

/// Items expiring between today and `days` from now
#[utoipa::path(
    get,
    path = "/expiring",
    tag = "Inventory",
    params(ExpiringQuery),
    responses(
        (status = 200, description = "Expiring items, soonest first", body = Vec<InventoryItemView>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn expiring_items<R: InventoryRepository>(
    State(service): SharedService<R>,
    query: Result<Query<ExpiringQuery>, QueryRejection>,
) -> InventoryResult<ApiResponse<Vec<InventoryItemView>>> {
    let days = query_params(query)?.days.map(u64::from);
    let items = service.expiring_items(days).await?;
    Ok(ApiResponse::new(items))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Inventory",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = InventoryItemView),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_item<R: InventoryRepository>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
) -> InventoryResult<ApiResponse<InventoryItemView>> {
    let item = service.get_item(id).await?;
    Ok(ApiResponse::new(item))
}

/// Partially update an item; `null` clears an optional field
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Inventory",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateInventoryItem,
    responses(
        (status = 200, description = "Item updated", body = InventoryItemView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_item<R: InventoryRepository>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
    JsonObject(payload): JsonObject,
) -> InventoryResult<ApiResponse<InventoryItemView>> {
    let item = service.update_item(id, &payload).await?;
    Ok(ApiResponse::new(item))
}

/// Set the stock count of an item
#[utoipa::path(
    patch,
    path = "/{id}/quantity",
    tag = "Inventory",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = QuantityUpdate,
    responses(
        (status = 200, description = "Quantity updated", body = InventoryItemView),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_quantity<R: InventoryRepository>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
    JsonObject(payload): JsonObject,
) -> InventoryResult<ApiResponse<InventoryItemView>> {
    let item = service.update_quantity(id, &payload).await?;
    Ok(ApiResponse::new(item))
}

/// Delete an item permanently
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Inventory",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_item<R: InventoryRepository>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
) -> InventoryResult<StatusCode> {
    service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
