//! Basic usage example for the PysonDB-KV client
//!
//! Run with: KV_BASE_URL=https://meow.workers.dev KV_AUTH_KEY=meow \
//!     cargo run --example basic_usage

use pysondb_kv_client::Client;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Serialize)]
struct Person {
    name: String,
    age: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    // Get service coordinates from the environment
    let base_url =
        std::env::var("KV_BASE_URL").unwrap_or_else(|_| "http://localhost:8787".to_string());
    let auth_key = std::env::var("KV_AUTH_KEY").unwrap_or_else(|_| "meow".to_string());

    // Create client
    let client = Client::new(&base_url, &auth_key)?;

    // Check the service is reachable
    info!("Checking service health...");
    let healthy = client.health_check().await?;
    info!("Service reachable: {}", healthy);

    // Add an item; the server assigns the key
    info!("Adding an item...");
    let added = client
        .add(&Person {
            name: "Alice".to_string(),
            age: 25,
        })
        .await?;
    info!("Add response: {:?}", added);
    let key = added
        .key()
        .ok_or("add response did not carry a key")?
        .to_string();
    info!("Assigned key: {}", key);

    // Get the item back
    let item = client.get(&key).await?;
    info!("Get response: {:?}", item);

    // Get all items
    let all = client.get_all().await?;
    info!("Get all response: {:?}", all);

    // Update the item
    let ack = client.update(&key, &serde_json::json!({"age": 26})).await?;
    info!("Update response: {:?}", ack);

    // Delete the item
    let ack = client.delete(&key).await?;
    info!("Delete response: {:?}", ack);

    // Delete everything that's left
    let ack = client.delete_all().await?;
    info!("Delete all response: {:?}", ack);

    info!("Example completed successfully!");
    Ok(())
}
