//! Tour of the MongoDB bridge surface.
//!
//! Run with:
//! ```bash
//! cargo run -p docbridge-mongodb --example bridge_tour
//! ```
//!
//! Without `MONGODB_URL` the tour stops after the offline diagnostics; set it
//! to a reachable server (e.g. `mongodb://localhost:27017/tour`) to run the
//! live part as well.

use anyhow::Result;
use bson::doc;
use docbridge_mongodb::{BridgeConfig, CollectionDefs, ConnectionOptions, MongodbBridge};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let live_url = std::env::var("MONGODB_URL").ok();

    let config = BridgeConfig {
        connection_options: ConnectionOptions {
            host: Some("localhost".to_string()),
            name: Some("tour".to_string()),
            username: Some("app".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        },
        connection_string: live_url.clone(),
        collections: CollectionDefs::from([
            ("users".to_string(), "users_col".to_string()),
            ("orders".to_string(), "orders_col".to_string()),
        ]),
        tracking_code: Some("bridge-tour".to_string()),
        ..Default::default()
    };
    let bridge = MongodbBridge::new(config);

    // Offline diagnostics: note the redacted password in both places.
    for record in bridge.service_help() {
        println!("# {}", record.title);
        for (key, caption) in &record.label {
            if let Some(value) = record.data.get(key) {
                println!("{}:\n{}\n", caption, value);
            }
        }
    }

    if live_url.is_none() {
        println!("MONGODB_URL not set, skipping live operations");
        return Ok(());
    }

    bridge.ping().await?;

    let inserted_id = bridge
        .insert_document("users", doc! { "name": "alice" })
        .await?;
    println!("inserted: {}", inserted_id);

    let summary = bridge.document_summary().await?;
    println!("summary: {}", serde_json::to_string_pretty(&summary)?);

    bridge.delete_document("users", doc! { "name": "alice" }).await?;
    bridge.close(false).await?;
    Ok(())
}
