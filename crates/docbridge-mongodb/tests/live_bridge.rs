//! Integration tests against a running mongod.
//!
//! Every test here needs a reachable server and is ignored by default:
//!
//! ```bash
//! cargo test -p docbridge-mongodb -- --ignored
//! ```
//!
//! The tests use the `docbridge_it` database on `localhost:27017` and clean
//! up the documents they create.

use bson::{doc, oid::ObjectId, Document as BsonDocument};
use docbridge_mongodb::{
    BridgeConfig, CollectionDefs, ConnectionOptions, MongodbBridge, UpdateOptions,
};

fn live_bridge(collections: CollectionDefs) -> MongodbBridge {
    MongodbBridge::new(BridgeConfig {
        connection_options: ConnectionOptions {
            name: Some("docbridge_it".to_string()),
            ..Default::default()
        },
        collections,
        tracking_code: Some("live-test".to_string()),
        ..Default::default()
    })
}

fn scratch_collection(prefix: &str) -> String {
    format!("{}_{}", prefix, ObjectId::new().to_hex())
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn insert_then_fetch_by_id_round_trips() {
    let collection = scratch_collection("round_trip");
    let bridge = live_bridge(CollectionDefs::new());

    let inserted_id = bridge
        .insert_document(&collection, doc! { "name": "alice", "age": 31 })
        .await
        .expect("insert");
    let id_hex = inserted_id.as_object_id().expect("object id").to_hex();

    let fetched = bridge
        .get_document_by_id(&collection, &id_hex)
        .await
        .expect("fetch")
        .expect("document present");
    assert_eq!(fetched.get_str("name").unwrap(), "alice");
    assert_eq!(fetched.get_i32("age").unwrap(), 31);

    bridge.delete_document(&collection, doc! {}).await.expect("cleanup");
    bridge.close(false).await.expect("close");
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn update_defaults_touch_every_match_without_upsert() {
    let collection = scratch_collection("update");
    let bridge = live_bridge(CollectionDefs::new());

    bridge
        .insert_documents(
            &collection,
            vec![
                doc! { "group": "a", "seen": false },
                doc! { "group": "a", "seen": false },
                doc! { "group": "b", "seen": false },
            ],
        )
        .await
        .expect("seed");

    let outcome = bridge
        .update_document(&collection, doc! { "group": "a" }, doc! { "seen": true }, None)
        .await
        .expect("update");
    assert_eq!(outcome.matched_count, 2);
    assert_eq!(outcome.modified_count, 2);
    assert!(outcome.upserted_id.is_none());

    let missed = bridge
        .update_document(
            &collection,
            doc! { "group": "missing" },
            doc! { "seen": true },
            Some(UpdateOptions {
                multi: false,
                upsert: false,
            }),
        )
        .await
        .expect("update without match");
    assert_eq!(missed.matched_count, 0);
    assert!(missed.upserted_id.is_none());

    bridge.delete_document(&collection, doc! {}).await.expect("cleanup");
    bridge.close(false).await.expect("close");
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn pagination_skips_and_limits() {
    let collection = scratch_collection("page");
    let bridge = live_bridge(CollectionDefs::new());

    let seed: Vec<BsonDocument> = (0..10).map(|n| doc! { "n": n }).collect();
    bridge.insert_documents(&collection, seed).await.expect("seed");

    let page = bridge
        .get_documents(&collection, 4, 3)
        .await
        .expect("page");
    assert_eq!(page.len(), 3);

    let count = bridge
        .count_documents(&collection, None)
        .await
        .expect("count");
    assert_eq!(count, 10);

    bridge.delete_document(&collection, doc! {}).await.expect("cleanup");
    bridge.close(false).await.expect("close");
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn hierarchy_walk_ascends_to_root() {
    let collection = scratch_collection("tree");
    let bridge = live_bridge(CollectionDefs::new());

    let root = bridge
        .insert_document(&collection, doc! { "name": "root" })
        .await
        .expect("insert root")
        .as_object_id()
        .expect("object id");
    let mid = bridge
        .insert_document(&collection, doc! { "name": "mid", "parentId": root })
        .await
        .expect("insert mid")
        .as_object_id()
        .expect("object id");
    let leaf = bridge
        .insert_document(&collection, doc! { "name": "leaf", "parentId": mid })
        .await
        .expect("insert leaf")
        .as_object_id()
        .expect("object id");

    let chain = bridge
        .get_hierarchical_documents_to_top(&collection, &leaf.to_hex())
        .await
        .expect("walk");
    let names: Vec<&str> = chain.iter().map(|d| d.get_str("name").unwrap()).collect();
    assert_eq!(names, ["leaf", "mid", "root"]);

    let missing = bridge
        .get_hierarchical_documents_to_top(&collection, &ObjectId::new().to_hex())
        .await
        .expect("walk from missing id");
    assert!(missing.is_empty());

    let chains = bridge
        .get_chains_to_top_by_ids(
            &collection,
            &[mid.to_hex(), ObjectId::new().to_hex()],
        )
        .await
        .expect("chains");
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].document_id, mid.to_hex());
    assert_eq!(chains[0].document.get_str("name").unwrap(), "mid");
    assert_eq!(chains[0].chain.len(), 2);

    bridge.delete_document(&collection, doc! {}).await.expect("cleanup");
    bridge.close(false).await.expect("close");
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn document_summary_counts_only_existing_collections() {
    let users_col = scratch_collection("users");
    let orders_col = scratch_collection("orders");
    let bridge = live_bridge(CollectionDefs::from([
        ("users".to_string(), users_col.clone()),
        ("orders".to_string(), orders_col.clone()),
    ]));

    // Only the users collection is materialized.
    bridge
        .insert_documents(
            "users",
            vec![doc! { "name": "alice" }, doc! { "name": "bob" }],
        )
        .await
        .expect("seed");

    let summary = bridge.document_summary().await.expect("summary");
    assert_eq!(summary.count.get(&users_col), Some(&2u64));
    assert_eq!(summary.label.get(&users_col), Some(&users_col));
    assert!(!summary.count.contains_key(&orders_col));

    bridge.delete_document("users", doc! {}).await.expect("cleanup");
    bridge.close(false).await.expect("close");
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn close_releases_and_reconnects() {
    let collection = scratch_collection("lifecycle");
    let bridge = live_bridge(CollectionDefs::new());

    bridge
        .insert_document(&collection, doc! { "phase": 1 })
        .await
        .expect("insert before close");

    bridge.close(false).await.expect("close");
    bridge.close(false).await.expect("second close is a no-op");

    // A later operation reconnects transparently.
    let count = bridge
        .count_documents(&collection, None)
        .await
        .expect("count after close");
    assert_eq!(count, 1);

    bridge.delete_document(&collection, doc! {}).await.expect("cleanup");
    bridge.close(true).await.expect("forced close");
}

#[tokio::test]
#[ignore = "requires a running mongod on localhost:27017"]
async fn ping_and_stats_report_the_database() {
    let bridge = live_bridge(CollectionDefs::new());

    assert!(bridge.ping().await.expect("ping"));
    let stats = bridge.stats().await.expect("stats");
    assert_eq!(stats.get_str("db").unwrap(), "docbridge_it");

    bridge.close(false).await.expect("close");
}
