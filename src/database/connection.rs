use mongodb::{Client, Database};

pub async fn get_db_client(database_url: &str, database_name: &str) -> Database {
    let client = Client::with_uri_str(database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db = client.database(database_name);

    // Verify database is reachable by listing collections
    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", database_name);
            tracing::info!("📂 Collections found: {:?}", collections);

            if !collections.contains(&"clients".to_string()) {
                tracing::warn!("'clients' collection not found in database");
            }
        }
        Err(e) => {
            tracing::error!(
                "Database '{}' may not exist or is inaccessible: {}",
                database_name,
                e
            );
        }
    }

    db
}
