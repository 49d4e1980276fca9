//! Shared application state passed to the route builders.

use mongodb::{Client, Database};

/// Cloned per router (the MongoDB handles share one connection pool)
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
