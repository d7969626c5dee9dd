//! Typed views over response bodies.
//!
//! Managers return the parsed JSON unchanged. These structs are for callers
//! that want typed access (the CLI renders tables from them). Every field is
//! lenient: unknown fields are ignored, and missing or `null` ones take their
//! default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;

/// Decode a response body into `T`.
pub fn parse<T: DeserializeOwned>(value: &Value) -> Result<T> {
    Ok(T::deserialize(value)?)
}

/// Missing keys and explicit `null`s both decode to `T::default()`.
fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_default")]
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "null_default")]
    pub has_more: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub limit: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub description: Option<String>,
    pub permission: Option<String>,
    pub indexing_technique: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub document_count: u64,
    #[serde(deserialize_with = "null_default")]
    pub word_count: u64,
    pub embedding_model: Option<String>,
    pub embedding_model_provider: Option<String>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    pub position: Option<u32>,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub indexing_status: Option<String>,
    pub word_count: Option<u64>,
    pub enabled: Option<bool>,
    pub doc_form: Option<String>,
    pub created_at: Option<i64>,
}

/// Response of the create-by-text / create-by-file endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentCreated {
    #[serde(deserialize_with = "null_default")]
    pub document: DocumentInfo,
    #[serde(deserialize_with = "null_default")]
    pub batch: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexingStatus {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub indexing_status: String,
    #[serde(deserialize_with = "null_default")]
    pub completed_segments: u64,
    #[serde(deserialize_with = "null_default")]
    pub total_segments: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SegmentInfo {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    pub position: Option<u32>,
    #[serde(deserialize_with = "null_default")]
    pub content: String,
    pub answer: Option<String>,
    pub word_count: Option<u64>,
    pub tokens: Option<u64>,
    pub keywords: Option<Vec<String>>,
    pub status: Option<String>,
    pub enabled: Option<bool>,
    pub hit_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChildChunk {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub segment_id: String,
    #[serde(deserialize_with = "null_default")]
    pub content: String,
    pub word_count: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataField {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_default")]
    pub field_type: String,
    #[serde(deserialize_with = "null_default")]
    pub use_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataList {
    #[serde(deserialize_with = "null_default")]
    pub doc_metadata: Vec<MetadataField>,
    #[serde(deserialize_with = "null_default")]
    pub built_in_field_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrievedDocument {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrievedSegment {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub content: String,
    pub answer: Option<String>,
    pub document: Option<RetrievedDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrievalRecord {
    #[serde(deserialize_with = "null_default")]
    pub segment: RetrievedSegment,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrievalResult {
    #[serde(deserialize_with = "null_default")]
    pub records: Vec<RetrievalRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingModel {
    #[serde(deserialize_with = "null_default")]
    pub model: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingProvider {
    #[serde(deserialize_with = "null_default")]
    pub provider: String,
    #[serde(deserialize_with = "null_default")]
    pub models: Vec<EmbeddingModel>,
}
