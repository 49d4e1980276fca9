//! Success envelopes: `{ "success": true, "data": ... }`.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Single-value success envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Page metadata returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching records across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u64,
    /// Page size
    pub limit: u64,
    /// Number of pages, `ceil(total / limit)`
    pub pages: u64,
}

impl PaginationMeta {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

/// List success envelope with pagination metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: PaginationMeta) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_pages_round_up() {
        assert_eq!(PaginationMeta::new(21, 1, 10).pages, 3);
        assert_eq!(PaginationMeta::new(20, 2, 10).pages, 2);
        assert_eq!(PaginationMeta::new(0, 1, 10).pages, 0);
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::new(vec!["a"])).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": ["a"] }));

        let page = PaginatedResponse::new(vec![1, 2], PaginationMeta::new(2, 1, 10));
        let json = serde_json::to_value(page).unwrap();
        assert_eq!(json["pagination"]["pages"], 1);
        assert_eq!(json["success"], true);
    }
}
