//! Knowledge base (dataset) operations.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::require_id;
use crate::error::Result;
use crate::payload::{
    build_dataset_create, build_dataset_update, DatasetSpec, DatasetUpdateSpec, ListDatasetsQuery,
};
use crate::transport::Transport;

/// Create, list, update, and delete datasets.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseManager {
    transport: Arc<Transport>,
}

impl KnowledgeBaseManager {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// `GET /datasets` with keyword, tag, and page filters.
    pub async fn list(&self, query: &ListDatasetsQuery) -> Result<Value> {
        self.transport.get("/datasets", &query.to_query()).await
    }

    pub async fn get(&self, dataset_id: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        self.transport
            .get(&format!("/datasets/{}", dataset_id), &[])
            .await
    }

    pub async fn create(&self, spec: &DatasetSpec) -> Result<Value> {
        let payload = build_dataset_create(spec);
        debug!(name = %payload.name, permission = %payload.permission, "creating dataset");
        self.transport.post("/datasets", &payload).await
    }

    /// Patch a dataset. Only the fields set in `spec` are sent.
    pub async fn update(&self, dataset_id: &str, spec: &DatasetUpdateSpec) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let payload = build_dataset_update(spec);
        self.transport
            .patch(&format!("/datasets/{}", dataset_id), &payload)
            .await
    }

    pub async fn delete(&self, dataset_id: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        self.transport
            .delete(&format!("/datasets/{}", dataset_id))
            .await
    }

    /// Text-embedding models available to the current workspace.
    pub async fn embedding_models(&self) -> Result<Value> {
        self.transport
            .get("/workspaces/current/models/model-types/text-embedding", &[])
            .await
    }
}
