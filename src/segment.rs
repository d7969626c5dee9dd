//! Segment (chunk) and child-chunk operations within a document.

use std::sync::Arc;

use serde_json::Value;

use crate::client::require_id;
use crate::error::Result;
use crate::payload::{
    build_segment_update, build_segments, ChildChunkPayload, ListQuery, ListSegmentsQuery, Segment,
    SegmentUpdate,
};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct SegmentManager {
    transport: Arc<Transport>,
}

impl SegmentManager {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    fn segments_path(dataset_id: &str, document_id: &str) -> Result<String> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let document_id = require_id("document_id", document_id)?;
        Ok(format!(
            "/datasets/{}/documents/{}/segments",
            dataset_id, document_id
        ))
    }

    fn segment_path(dataset_id: &str, document_id: &str, segment_id: &str) -> Result<String> {
        let base = Self::segments_path(dataset_id, document_id)?;
        let segment_id = require_id("segment_id", segment_id)?;
        Ok(format!("{}/{}", base, segment_id))
    }

    /// Add segments to a document in the given order.
    pub async fn add(
        &self,
        dataset_id: &str,
        document_id: &str,
        segments: &[Segment],
    ) -> Result<Value> {
        let path = Self::segments_path(dataset_id, document_id)?;
        self.transport.post(&path, &build_segments(segments)).await
    }

    pub async fn list(
        &self,
        dataset_id: &str,
        document_id: &str,
        query: &ListSegmentsQuery,
    ) -> Result<Value> {
        let path = Self::segments_path(dataset_id, document_id)?;
        self.transport.get(&path, &query.to_query()).await
    }

    /// Apply a partial update. The body is wrapped as `{"segment": {...}}`.
    pub async fn update(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        update: &SegmentUpdate,
    ) -> Result<Value> {
        let path = Self::segment_path(dataset_id, document_id, segment_id)?;
        self.transport
            .post(&path, &build_segment_update(update))
            .await
    }

    pub async fn delete(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
    ) -> Result<Value> {
        let path = Self::segment_path(dataset_id, document_id, segment_id)?;
        self.transport.delete(&path).await
    }

    pub async fn create_child_chunk(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        content: &str,
    ) -> Result<Value> {
        let path = Self::segment_path(dataset_id, document_id, segment_id)?;
        let payload = ChildChunkPayload {
            content: content.to_string(),
        };
        self.transport
            .post(&format!("{}/child_chunks", path), &payload)
            .await
    }

    pub async fn list_child_chunks(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        query: &ListQuery,
    ) -> Result<Value> {
        let path = Self::segment_path(dataset_id, document_id, segment_id)?;
        self.transport
            .get(&format!("{}/child_chunks", path), &query.to_query())
            .await
    }

    pub async fn update_child_chunk(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        child_chunk_id: &str,
        content: &str,
    ) -> Result<Value> {
        let path = Self::segment_path(dataset_id, document_id, segment_id)?;
        let child_chunk_id = require_id("child_chunk_id", child_chunk_id)?;
        let payload = ChildChunkPayload {
            content: content.to_string(),
        };
        self.transport
            .patch(&format!("{}/child_chunks/{}", path, child_chunk_id), &payload)
            .await
    }

    pub async fn delete_child_chunk(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        child_chunk_id: &str,
    ) -> Result<Value> {
        let path = Self::segment_path(dataset_id, document_id, segment_id)?;
        let child_chunk_id = require_id("child_chunk_id", child_chunk_id)?;
        self.transport
            .delete(&format!("{}/child_chunks/{}", path, child_chunk_id))
            .await
    }
}
