//! Hierarchical traversal over parent back-references
//!
//! Hierarchical entities carry a `parentId` field pointing at their parent
//! document. The walk ascends one fetch at a time, so it is inherently
//! sequential and bounded by the depth of the chain.

use std::collections::HashSet;

use bson::{Bson, Document as BsonDocument};
use docbridge_common::Result;
use serde::Serialize;
use tracing::warn;

use crate::bridge::MongodbBridge;

/// Field holding the back-reference to the parent document
pub const PARENT_ID_FIELD: &str = "parentId";

/// One ascending chain, from the starting (leaf) document to the root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchicalChain {
    /// The id the walk started from
    pub document_id: String,
    /// The starting document itself (first element of `chain`)
    pub document: BsonDocument,
    /// The full ascending chain
    pub chain: Vec<BsonDocument>,
}

/// Extracts the next id to fetch from a document's parent reference.
/// Absent, null, empty or non-id-shaped values end the walk.
pub(crate) fn parent_document_id(document: &BsonDocument) -> Option<String> {
    match document.get(PARENT_ID_FIELD) {
        Some(Bson::ObjectId(parent)) => Some(parent.to_hex()),
        Some(Bson::String(parent)) if !parent.is_empty() => Some(parent.clone()),
        _ => None,
    }
}

impl MongodbBridge {
    /// Walks the parent chain upward from `document_id`.
    ///
    /// Each step fetches the current document, appends it, and advances to
    /// its parent reference. The walk ends at the first missing document or
    /// absent parent id; an empty starting id yields an empty chain without
    /// touching the driver. A repeated id means the data is not a tree; the
    /// walk stops there rather than looping.
    pub async fn get_hierarchical_documents_to_top(
        &self,
        entity: &str,
        document_id: &str,
    ) -> Result<Vec<BsonDocument>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next_id = Some(document_id.to_string()).filter(|id| !id.trim().is_empty());

        while let Some(id) = next_id.take() {
            if !seen.insert(id.clone()) {
                warn!(
                    tracking_code = %self.tracking_code(),
                    entity,
                    id,
                    "parent chain contains a cycle, stopping ascent"
                );
                break;
            }
            if let Some(document) = self.get_document_by_id(entity, &id).await? {
                next_id = parent_document_id(&document);
                chain.push(document);
            }
        }

        Ok(chain)
    }

    /// Runs the ascent for each id in turn and keeps the non-empty chains,
    /// recording the originating id and the leaf document alongside each.
    /// The first failing walk aborts the remaining ids.
    pub async fn get_chains_to_top_by_ids<S: AsRef<str>>(
        &self,
        entity: &str,
        document_ids: &[S],
    ) -> Result<Vec<HierarchicalChain>> {
        let mut chains = Vec::new();
        for document_id in document_ids {
            let document_id = document_id.as_ref();
            let chain = self
                .get_hierarchical_documents_to_top(entity, document_id)
                .await?;
            if let Some(leaf) = chain.first().cloned() {
                chains.push(HierarchicalChain {
                    document_id: document_id.to_string(),
                    document: leaf,
                    chain,
                });
            }
        }
        Ok(chains)
    }
}
