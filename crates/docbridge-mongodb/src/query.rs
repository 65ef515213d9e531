//! Query builder for paginated find operations

use bson::Document as BsonDocument;
use docbridge_common::Result;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

/// Builder for find operations with filter, sort and skip/limit pagination
pub struct QueryBuilder {
    collection_name: String,
    filter: BsonDocument,
    sort: Option<BsonDocument>,
    skip: Option<u64>,
    limit: Option<i64>,
}

impl QueryBuilder {
    /// Create a new query builder over a physical collection
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            filter: BsonDocument::new(),
            sort: None,
            skip: None,
            limit: None,
        }
    }

    /// Set the filter document
    pub fn filter(mut self, filter: BsonDocument) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort order
    pub fn sort(mut self, sort: BsonDocument) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the number of documents to skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the maximum number of documents to return
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Get the collection name
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Get the filter document
    pub fn get_filter(&self) -> &BsonDocument {
        &self.filter
    }

    /// Get the sort document
    pub fn get_sort(&self) -> Option<&BsonDocument> {
        self.sort.as_ref()
    }

    /// Get the skip value
    pub fn get_skip(&self) -> Option<u64> {
        self.skip
    }

    /// Get the limit value
    pub fn get_limit(&self) -> Option<i64> {
        self.limit
    }

    /// Execute the query and return all matching documents
    pub async fn to_list(self, db: &Database) -> Result<Vec<BsonDocument>> {
        let collection: Collection<BsonDocument> = db.collection(&self.collection_name);

        let mut find = collection.find(self.filter);
        if let Some(sort) = self.sort {
            find = find.sort(sort);
        }
        if let Some(skip) = self.skip {
            find = find.skip(skip);
        }
        if let Some(limit) = self.limit {
            find = find.limit(limit);
        }

        let cursor = find.await?;
        let results = cursor.try_collect().await?;

        Ok(results)
    }
}
