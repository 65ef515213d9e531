//! The MongoDB bridge facade
//!
//! One `MongodbBridge` instance owns one lazily-constructed driver client and
//! exposes the CRUD surface the host framework calls. Every operation logs its
//! outcome with the instance's tracking code before the result or error is
//! handed back; malformed identifiers fail before any driver contact.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bson::{doc, Bson, Document as BsonDocument};
use chrono::{SecondsFormat, Utc};
use docbridge_common::{Bridge, HelpRecord, Result};
use futures::TryStreamExt;
use mongodb::Collection;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{BridgeConfig, CollectionDefs, ConnectionOptions};
use crate::connection::{Connection, PoolConfig};
use crate::info::{DocumentSummary, ServiceInfo};
use crate::query::QueryBuilder;
use crate::validation::{
    normalize_document_id, validate_criteria, ValidatedCollectionName, ValidatedFieldName,
};

/// Options for `update_document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// Update every matching document instead of only the first
    pub multi: bool,
    /// Insert when no document matches the criteria
    pub upsert: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            multi: true,
            upsert: false,
        }
    }
}

/// What an update actually did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

/// A configured MongoDB adapter with a lazily-constructed client.
///
/// Entity names are resolved through the configured collection definitions;
/// names with no mapping pass through as physical collection names.
pub struct MongodbBridge {
    options: ConnectionOptions,
    connection_string: String,
    collections: CollectionDefs,
    tracking_code: String,
    enabled: bool,
    pool: PoolConfig,
    connection: RwLock<Option<Connection>>,
}

impl MongodbBridge {
    /// Creates a bridge with default driver pool settings. No connection is
    /// made until the first operation.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_pool_config(config, PoolConfig::default())
    }

    /// Creates a bridge with explicit driver pool settings
    pub fn with_pool_config(config: BridgeConfig, pool: PoolConfig) -> Self {
        let connection_string = config.connection_url();
        let tracking_code = config
            .tracking_code
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        Self {
            options: config.connection_options,
            connection_string,
            collections: config.collections,
            tracking_code,
            enabled: config.enabled.unwrap_or(true),
            pool,
            connection: RwLock::new(None),
        }
    }

    /// Correlation code attached to every log line of this instance
    pub fn tracking_code(&self) -> &str {
        &self.tracking_code
    }

    /// Whether the host should route traffic through this bridge
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Redacted connection configuration, computed URL and collection map.
    /// Side-effect-free.
    pub fn service_info(&self) -> ServiceInfo {
        let connection_info = self.options.redacted();
        ServiceInfo {
            url: connection_info.url(),
            connection_info,
            collection_defs: self.collections.clone(),
        }
    }

    /// One management-console record summarizing this bridge
    pub fn service_help(&self) -> Vec<HelpRecord> {
        let info = self.service_info();

        let mut record = HelpRecord::record("MongoDB bridge");
        record.label = BTreeMap::from([
            ("connection_info".to_string(), "Connection options".to_string()),
            ("url".to_string(), "URL".to_string()),
            ("collection_defs".to_string(), "Collections".to_string()),
        ]);
        record.data = BTreeMap::from([
            ("connection_info".to_string(), to_pretty_json(&info.connection_info)),
            ("url".to_string(), info.url),
            ("collection_defs".to_string(), to_pretty_json(&info.collection_defs)),
        ]);

        vec![record]
    }

    /// Resolves a logical entity name to its validated physical collection
    fn physical_collection(&self, entity: &str) -> Result<ValidatedCollectionName> {
        let name = self
            .collections
            .get(entity)
            .map(String::as_str)
            .unwrap_or(entity);
        ValidatedCollectionName::new(name)
    }

    /// Returns the shared connection, constructing it on first use
    async fn connection(&self) -> Result<Connection> {
        {
            let guard = self.connection.read().await;
            if let Some(connection) = guard.as_ref() {
                return Ok(connection.clone());
            }
        }

        let mut guard = self.connection.write().await;
        if let Some(connection) = guard.as_ref() {
            return Ok(connection.clone());
        }

        info!(
            tracking_code = %self.tracking_code,
            url = %self.options.redacted().url(),
            "connecting MongoDB client"
        );
        let connection = Connection::with_config(&self.connection_string, self.pool.clone()).await?;
        *guard = Some(connection.clone());
        Ok(connection)
    }

    async fn collection_handle(&self, entity: &str) -> Result<Collection<BsonDocument>> {
        let name = self.physical_collection(entity)?;
        let connection = self.connection().await?;
        Ok(connection.collection(name.as_str()))
    }

    async fn find_all(
        collection: Collection<BsonDocument>,
        filter: BsonDocument,
    ) -> Result<Vec<BsonDocument>> {
        let cursor = collection.find(filter).await?;
        let documents = cursor.try_collect().await?;
        Ok(documents)
    }

    /// Releases the client if present; a later operation reconnects.
    /// No-op when the bridge never connected or was already closed.
    pub async fn close(&self, forced: bool) -> Result<()> {
        let released = self.connection.write().await.take();
        match released {
            Some(connection) => {
                info!(tracking_code = %self.tracking_code, forced, "closing MongoDB client");
                connection.shutdown(forced).await;
            }
            None => {
                debug!(tracking_code = %self.tracking_code, "close called without an open client");
            }
        }
        Ok(())
    }

    /// Database statistics (`dbStats`)
    pub async fn stats(&self) -> Result<BsonDocument> {
        self.connection().await?.stats().await
    }

    /// Names of the collections present in the database
    pub async fn collection_names(&self) -> Result<Vec<String>> {
        self.connection().await?.list_collection_names().await
    }

    /// Server round-trip health check
    pub async fn ping(&self) -> Result<bool> {
        self.connection().await?.ping().await
    }

    /// Counts documents matching `criteria`; `None` counts the whole entity
    pub async fn count_documents(
        &self,
        entity: &str,
        criteria: Option<BsonDocument>,
    ) -> Result<u64> {
        let criteria = criteria.unwrap_or_default();
        validate_criteria(&criteria)?;
        let collection = self.collection_handle(entity).await?;
        let count = collection.count_documents(criteria).await?;
        Ok(count)
    }

    /// Paginated fetch of documents matching `criteria`
    pub async fn find_documents(
        &self,
        entity: &str,
        criteria: BsonDocument,
        start: u64,
        limit: i64,
    ) -> Result<Vec<BsonDocument>> {
        validate_criteria(&criteria)?;
        let name = self.physical_collection(entity)?;
        let connection = self.connection().await?;

        let documents = QueryBuilder::new(name.as_str())
            .filter(criteria)
            .skip(start)
            .limit(limit)
            .to_list(connection.database())
            .await?;

        debug!(
            tracking_code = %self.tracking_code,
            entity,
            start,
            limit,
            returned = documents.len(),
            "find_documents"
        );
        Ok(documents)
    }

    /// Paginated fetch of the whole entity
    pub async fn get_documents(
        &self,
        entity: &str,
        start: u64,
        limit: i64,
    ) -> Result<Vec<BsonDocument>> {
        self.find_documents(entity, BsonDocument::new(), start, limit)
            .await
    }

    /// Fetches a single document matching `criteria`
    pub async fn find_one_document(
        &self,
        entity: &str,
        criteria: BsonDocument,
    ) -> Result<Option<BsonDocument>> {
        validate_criteria(&criteria)?;
        let collection = self.collection_handle(entity).await?;
        match collection.find_one(criteria.clone()).await {
            Ok(found) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    criteria = %criteria,
                    found = found.is_some(),
                    "find_one_document"
                );
                Ok(found)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    criteria = %criteria,
                    error = %err,
                    "find_one_document failed"
                );
                Err(err.into())
            }
        }
    }

    /// Fetches a document by its identifier. A blank or malformed id fails
    /// before any driver contact.
    pub async fn get_document_by_id(
        &self,
        entity: &str,
        id: &str,
    ) -> Result<Option<BsonDocument>> {
        let object_id = normalize_document_id(entity, id)?;
        let collection = self.collection_handle(entity).await?;
        match collection.find_one(doc! { "_id": object_id }).await {
            Ok(found) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    id,
                    found = found.is_some(),
                    "get_document_by_id"
                );
                Ok(found)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    id,
                    error = %err,
                    "get_document_by_id failed"
                );
                Err(err.into())
            }
        }
    }

    /// Fetches every document whose identifier is in `ids`. Each id is
    /// normalized first; any malformed id fails the whole call before driver
    /// contact.
    pub async fn get_documents_by_ids<S: AsRef<str>>(
        &self,
        entity: &str,
        ids: &[S],
    ) -> Result<Vec<BsonDocument>> {
        info!(
            tracking_code = %self.tracking_code,
            entity,
            requested = ids.len(),
            "get_documents_by_ids"
        );

        let object_ids = ids
            .iter()
            .map(|id| normalize_document_id(entity, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let collection = self.collection_handle(entity).await?;
        match Self::find_all(collection, doc! { "_id": { "$in": object_ids } }).await {
            Ok(documents) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    matched = documents.len(),
                    "get_documents_by_ids"
                );
                Ok(documents)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    error = %err,
                    "get_documents_by_ids failed"
                );
                Err(err)
            }
        }
    }

    /// Fetches all documents whose `source_id_field` equals `source_id`
    pub async fn get_one_to_many_targets_by_source_id(
        &self,
        entity: &str,
        source_id_field: &str,
        source_id: &str,
    ) -> Result<Vec<BsonDocument>> {
        let source_id = normalize_document_id(entity, source_id)?;
        let field = ValidatedFieldName::new(source_id_field)?;

        let mut criteria = BsonDocument::new();
        criteria.insert(field.as_str(), source_id);
        let collection = self.collection_handle(entity).await?;
        let documents = Self::find_all(collection, criteria).await?;

        debug!(
            tracking_code = %self.tracking_code,
            entity,
            field = %field,
            matched = documents.len(),
            "get_one_to_many_targets_by_source_id"
        );
        Ok(documents)
    }

    /// Inserts one document and returns its identifier
    pub async fn insert_document(&self, entity: &str, document: BsonDocument) -> Result<Bson> {
        let collection = self.collection_handle(entity).await?;
        match collection.insert_one(&document).await {
            Ok(result) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    inserted_id = %result.inserted_id,
                    "insert_document"
                );
                Ok(result.inserted_id)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    error = %err,
                    "insert_document failed"
                );
                Err(err.into())
            }
        }
    }

    /// Inserts a batch of documents and returns their identifiers in input
    /// order
    pub async fn insert_documents(
        &self,
        entity: &str,
        documents: Vec<BsonDocument>,
    ) -> Result<Vec<Bson>> {
        let collection = self.collection_handle(entity).await?;
        match collection.insert_many(&documents).await {
            Ok(result) => {
                let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
                ids.sort_by_key(|(index, _)| *index);
                let ids: Vec<Bson> = ids.into_iter().map(|(_, id)| id).collect();
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    inserted = ids.len(),
                    "insert_documents"
                );
                Ok(ids)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    error = %err,
                    "insert_documents failed"
                );
                Err(err.into())
            }
        }
    }

    /// Applies `data` as a `$set` update over documents matching `criteria`.
    /// `None` options default to a multi-document, non-upsert update.
    pub async fn update_document(
        &self,
        entity: &str,
        criteria: BsonDocument,
        data: BsonDocument,
        options: Option<UpdateOptions>,
    ) -> Result<UpdateOutcome> {
        let options = options.unwrap_or_default();
        validate_criteria(&criteria)?;
        let collection = self.collection_handle(entity).await?;

        let update = doc! { "$set": data };
        let result = if options.multi {
            collection
                .update_many(criteria.clone(), update)
                .upsert(options.upsert)
                .await
        } else {
            collection
                .update_one(criteria.clone(), update)
                .upsert(options.upsert)
                .await
        };

        match result {
            Ok(report) => {
                let outcome = UpdateOutcome {
                    matched_count: report.matched_count,
                    modified_count: report.modified_count,
                    upserted_id: report.upserted_id.map(|id| match id {
                        Bson::ObjectId(object_id) => object_id.to_hex(),
                        other => other.to_string(),
                    }),
                };
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    criteria = %criteria,
                    multi = options.multi,
                    upsert = options.upsert,
                    matched = outcome.matched_count,
                    modified = outcome.modified_count,
                    "update_document"
                );
                Ok(outcome)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    criteria = %criteria,
                    error = %err,
                    "update_document failed"
                );
                Err(err.into())
            }
        }
    }

    /// Deletes every document matching `criteria`, returning the deleted count
    pub async fn delete_document(&self, entity: &str, criteria: BsonDocument) -> Result<u64> {
        validate_criteria(&criteria)?;
        let collection = self.collection_handle(entity).await?;
        match collection.delete_many(criteria.clone()).await {
            Ok(result) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    criteria = %criteria,
                    deleted = result.deleted_count,
                    "delete_document"
                );
                Ok(result.deleted_count)
            }
            Err(err) => {
                info!(
                    tracking_code = %self.tracking_code,
                    entity,
                    criteria = %criteria,
                    error = %err,
                    "delete_document failed"
                );
                Err(err.into())
            }
        }
    }

    /// Counts documents per configured collection that actually exists.
    /// Collections are counted one at a time; the first failure aborts the
    /// rest.
    pub async fn document_summary(&self) -> Result<DocumentSummary> {
        let existing = self.collection_names().await?;

        let mut summary = DocumentSummary::default();
        for physical in self.collections.values() {
            if !existing.iter().any(|name| name == physical) {
                continue;
            }
            let count = self.count_documents(physical, None).await?;
            summary.label.insert(physical.clone(), physical.clone());
            summary.count.insert(physical.clone(), count);
        }
        Ok(summary)
    }
}

#[async_trait]
impl Bridge for MongodbBridge {
    fn tracking_code(&self) -> &str {
        &self.tracking_code
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn service_help(&self) -> Vec<HelpRecord> {
        MongodbBridge::service_help(self)
    }

    async fn close(&self, forced: bool) -> Result<()> {
        MongodbBridge::close(self, forced).await
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
