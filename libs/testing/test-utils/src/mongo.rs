//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that creates a MongoDB container for testing.

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let db = mongo.database("inventory_test");
/// // Hand `db` to a repository under test
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    pub connection_string: String,
}

impl TestMongo {
    /// Create a new standalone MongoDB instance (mongo:7.0)
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7.0")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}", host_port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        tracing::info!(port = host_port, "Test MongoDB ready (mongo 7.0)");

        Self {
            container,
            client,
            connection_string,
        }
    }

    /// Get a cloned client (shares the underlying pool)
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Get a database handle; use a distinct name per test to isolate data
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Get the connection string for manual client creation
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{Document, doc};

    #[tokio::test]
    async fn test_mongo_insert_find() {
        let mongo = TestMongo::new().await;
        let collection = mongo.database("smoke").collection::<Document>("things");

        collection
            .insert_one(doc! { "name": "mirror", "quantity": 3 })
            .await
            .unwrap();

        let found = collection
            .find_one(doc! { "name": "mirror" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_i32("quantity").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let mongo = TestMongo::new().await;
        mongo
            .database("first")
            .collection::<Document>("things")
            .insert_one(doc! { "name": "probe" })
            .await
            .unwrap();

        let count = mongo
            .database("second")
            .collection::<Document>("things")
            .count_documents(doc! {})
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
