//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dental Inventory API",
        version = "0.1.0",
        description = "REST API for tracking dental clinic supplies: stock levels, expiry dates and reorder reports",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/inventory", api = domain_inventory::ApiDoc)
    ),
    tags(
        (name = "Inventory", description = "Dental supply inventory endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;
