//! Document ingestion and lifecycle.
//!
//! Text documents are sent as JSON. File documents are sent as multipart
//! with the indexing settings serialized into a `data` part. Upload paths
//! are checked and read before any request is made, so a missing file never
//! reaches the network.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::require_id;
use crate::error::{Error, Result};
use crate::payload::{
    build_document_file_update, build_document_from_file, build_document_from_text,
    build_document_text_update, FileDocumentSpec, FileDocumentUpdate, ListQuery,
    TextDocumentSpec, TextDocumentUpdate,
};
use crate::transport::{MultipartUpload, Transport};

#[derive(Debug, Clone)]
pub struct DocumentManager {
    transport: Arc<Transport>,
}

impl DocumentManager {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, dataset_id: &str, query: &ListQuery) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        self.transport
            .get(&format!("/datasets/{}/documents", dataset_id), &query.to_query())
            .await
    }

    /// Create a document from raw text. The response carries the new
    /// document and the `batch` token for [`indexing_status`](Self::indexing_status).
    pub async fn create_from_text(&self, dataset_id: &str, spec: &TextDocumentSpec) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let payload = build_document_from_text(spec);
        self.transport
            .post(
                &format!("/datasets/{}/document/create-by-text", dataset_id),
                &payload,
            )
            .await
    }

    /// Upload a local file as a new document.
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] if `spec.file_path` does not exist; nothing is
    /// sent in that case.
    pub async fn create_from_file(&self, dataset_id: &str, spec: &FileDocumentSpec) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let payload = build_document_from_file(spec);
        let upload = prepare_upload(&spec.file_path, &payload).await?;
        self.transport
            .post_multipart(
                &format!("/datasets/{}/document/create-by-file", dataset_id),
                upload,
            )
            .await
    }

    pub async fn update_by_text(
        &self,
        dataset_id: &str,
        document_id: &str,
        spec: &TextDocumentUpdate,
    ) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let document_id = require_id("document_id", document_id)?;
        let payload = build_document_text_update(spec);
        self.transport
            .post(
                &format!("/datasets/{}/documents/{}/update-by-text", dataset_id, document_id),
                &payload,
            )
            .await
    }

    /// Replace a document's content with a local file.
    pub async fn update_by_file(
        &self,
        dataset_id: &str,
        document_id: &str,
        spec: &FileDocumentUpdate,
    ) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let document_id = require_id("document_id", document_id)?;
        let payload = build_document_file_update(spec);
        let upload = prepare_upload(&spec.file_path, &payload).await?;
        self.transport
            .post_multipart(
                &format!("/datasets/{}/documents/{}/update-by-file", dataset_id, document_id),
                upload,
            )
            .await
    }

    pub async fn delete(&self, dataset_id: &str, document_id: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let document_id = require_id("document_id", document_id)?;
        self.transport
            .delete(&format!("/datasets/{}/documents/{}", dataset_id, document_id))
            .await
    }

    /// Embedding progress for the documents created under `batch`.
    pub async fn indexing_status(&self, dataset_id: &str, batch: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let batch = require_id("batch", batch)?;
        self.transport
            .get(
                &format!("/datasets/{}/documents/{}/indexing-status", dataset_id, batch),
                &[],
            )
            .await
    }

    /// Metadata of the file a document was uploaded from.
    pub async fn upload_file(&self, dataset_id: &str, document_id: &str) -> Result<Value> {
        let dataset_id = require_id("dataset_id", dataset_id)?;
        let document_id = require_id("document_id", document_id)?;
        self.transport
            .get(
                &format!("/datasets/{}/documents/{}/upload-file", dataset_id, document_id),
                &[],
            )
            .await
    }
}

async fn prepare_upload<T: Serialize>(path: &Path, metadata: &T) -> Result<MultipartUpload> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidArgument(format!("not a file: {}", path.display())))?;

    debug!(file = %file_name, bytes = bytes.len(), "prepared upload");

    Ok(MultipartUpload {
        data: serde_json::to_string(metadata)?,
        file_name,
        bytes,
    })
}
