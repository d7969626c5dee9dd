//! Retrieval queries and dataset metadata.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::require_id;
use crate::error::Result;
use crate::payload::{
    build_retrieve, BuiltinMetadataAction, DocumentMetadataOperation, DocumentMetadataPayload,
    ExternalRetrievalModel, MetadataCreatePayload, MetadataRenamePayload, MetadataType,
    RetrievalModelConfig,
};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct RetrievalManager {
    transport: Arc<Transport>,
}

impl RetrievalManager {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Run a retrieval query against one dataset.
    ///
    /// Without `retrieval_model` the dataset's own retrieval settings apply.
    /// The override is shaped with the query variant, where `reranking_mode`
    /// carries the reranker when one is active.
    pub async fn retrieve(
        &self,
        dataset_id: &str,
        query: &str,
        retrieval_model: Option<&RetrievalModelConfig>,
        external_retrieval_model: Option<&ExternalRetrievalModel>,
    ) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let payload = build_retrieve(query, retrieval_model, external_retrieval_model);
        debug!(
            dataset_id,
            search_method = payload
                .retrieval_model
                .as_ref()
                .map(|m| m.search_method.as_str())
                .unwrap_or("dataset default"),
            "retrieving"
        );
        self.transport
            .post(&format!("/datasets/{}/retrieve", dataset_id), &payload)
            .await
    }

    pub async fn create_metadata(
        &self,
        dataset_id: &str,
        metadata_type: MetadataType,
        name: &str,
    ) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let payload = MetadataCreatePayload {
            metadata_type,
            name: name.to_string(),
        };
        self.transport
            .post(&format!("/datasets/{}/metadata", dataset_id), &payload)
            .await
    }

    /// Rename a metadata field.
    pub async fn update_metadata(
        &self,
        dataset_id: &str,
        metadata_id: &str,
        name: &str,
    ) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let metadata_id = require_id("metadata_id", metadata_id)?;
        let payload = MetadataRenamePayload {
            name: name.to_string(),
        };
        self.transport
            .patch(
                &format!("/datasets/{}/metadata/{}", dataset_id, metadata_id),
                &payload,
            )
            .await
    }

    pub async fn delete_metadata(&self, dataset_id: &str, metadata_id: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let metadata_id = require_id("metadata_id", metadata_id)?;
        self.transport
            .delete(&format!("/datasets/{}/metadata/{}", dataset_id, metadata_id))
            .await
    }

    pub async fn list_metadata(&self, dataset_id: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        self.transport
            .get(&format!("/datasets/{}/metadata", dataset_id), &[])
            .await
    }

    /// Enable or disable built-in metadata fields.
    ///
    /// `action` must be exactly `enable` or `disable`; anything else fails
    /// with [`Error::InvalidArgument`](crate::Error::InvalidArgument) before
    /// a request is made.
    pub async fn toggle_builtin_metadata(&self, dataset_id: &str, action: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let action: BuiltinMetadataAction = action.parse()?;
        self.transport
            .post_empty(&format!(
                "/datasets/{}/metadata/built-in/{}",
                dataset_id, action
            ))
            .await
    }

    /// Set metadata values on several documents at once.
    pub async fn update_documents_metadata(
        &self,
        dataset_id: &str,
        operations: &[DocumentMetadataOperation],
    ) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let payload = DocumentMetadataPayload {
            operation_data: operations.to_vec(),
        };
        self.transport
            .post(&format!("/datasets/{}/documents/metadata", dataset_id), &payload)
            .await
    }
}
