//! Request payload builders.
//!
//! Every remote operation that takes a body has a typed *spec* (what the
//! caller knows) and a serializable *payload* (what goes on the wire). The
//! `build_*` functions are pure: no I/O, no validation beyond shaping.
//!
//! Two serialization rules matter to the remote API and are encoded in the
//! payload types rather than in the builders:
//!
//! - **Sparse fields** (`Option<T>` with `skip_serializing_if`) are absent
//!   from the JSON when unset.
//! - **Explicit nulls** (`Option<T>` without skip) are always present and
//!   serialize as `null` when unset. [`RetrievalModel::weights`] and
//!   [`RetrievalModel::score_threshold`] work this way, and
//!   [`RetrievalModel::reranking_mode`] uses `Option<Option<_>>` to tell
//!   "absent" from "null".
//!
//! String options follow the remote client's falsy convention: an empty
//! string is treated as not supplied.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident : $label:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(Error::InvalidArgument(format!(
                        "unknown {} '{}': expected one of {}",
                        $label,
                        other,
                        [$($wire),+].join(", ")
                    ))),
                }
            }
        }
    };
}

wire_enum! {
    /// Search strategy used by a retrieval model.
    SearchMethod: "search method" {
        Semantic => "semantic_search",
        Keyword => "keyword_search",
        FullText => "full_text_search",
        Hybrid => "hybrid_search",
    }
}

wire_enum! {
    IndexingTechnique: "indexing technique" {
        HighQuality => "high_quality",
        Economy => "economy",
    }
}

wire_enum! {
    Permission: "permission" {
        OnlyMe => "only_me",
        AllTeamMembers => "all_team_members",
        PartialMembers => "partial_members",
    }
}

wire_enum! {
    /// Document layout. `qa_model` is the only form that uses a document language.
    DocForm: "document form" {
        Text => "text_model",
        Hierarchical => "hierarchical_model",
        Qa => "qa_model",
    }
}

wire_enum! {
    ProcessMode: "process mode" {
        Automatic => "automatic",
        Custom => "custom",
        Hierarchical => "hierarchical",
    }
}

wire_enum! {
    MetadataType: "metadata type" {
        String => "string",
        Number => "number",
        Time => "time",
    }
}

wire_enum! {
    /// Built-in metadata toggle. Only these two actions exist remotely.
    BuiltinMetadataAction: "built-in metadata action" {
        Enable => "enable",
        Disable => "disable",
    }
}

impl Default for SearchMethod {
    fn default() -> Self {
        SearchMethod::Semantic
    }
}

impl Default for IndexingTechnique {
    fn default() -> Self {
        IndexingTechnique::HighQuality
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::OnlyMe
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn non_empty_list<T: Clone>(value: &Option<Vec<T>>) -> Option<Vec<T>> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

// ============ Retrieval model ============

/// A reranking provider/model pair. Both halves travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reranker {
    pub provider: String,
    pub model: String,
}

impl Reranker {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// Caller-side retrieval settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalModelConfig {
    pub search_method: SearchMethod,
    pub top_k: u32,
    pub reranking_enabled: bool,
    pub reranking: Option<Reranker>,
    /// Semantic weight in `[0, 1]`; only meaningful for hybrid search.
    pub weights: Option<f64>,
    pub score_threshold_enabled: bool,
    pub score_threshold: Option<f64>,
}

impl Default for RetrievalModelConfig {
    fn default() -> Self {
        Self {
            search_method: SearchMethod::default(),
            top_k: 2,
            reranking_enabled: false,
            reranking: None,
            weights: None,
            score_threshold_enabled: false,
            score_threshold: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RerankingModel {
    pub reranking_provider_name: String,
    pub reranking_model_name: String,
}

impl From<&Reranker> for RerankingModel {
    fn from(r: &Reranker) -> Self {
        Self {
            reranking_provider_name: r.provider.clone(),
            reranking_model_name: r.model.clone(),
        }
    }
}

/// Wire form of a retrieval model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalModel {
    pub search_method: SearchMethod,
    pub reranking_enable: bool,
    /// `None` omits the key, `Some(None)` sends `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranking_mode: Option<Option<RerankingModel>>,
    pub reranking_model: RerankingModel,
    pub top_k: u32,
    pub score_threshold_enabled: bool,
    pub weights: Option<f64>,
    pub score_threshold: Option<f64>,
}

/// Retrieval model as attached to dataset creation, dataset update, and
/// first-upload documents.
///
/// Reranking enabled: the configured pair (or empty strings) and no
/// `reranking_mode` key. Disabled: empty strings and `reranking_mode: null`.
pub fn build_retrieval_model(config: &RetrievalModelConfig) -> RetrievalModel {
    let (reranking_mode, reranking_model) = if config.reranking_enabled {
        let model = config
            .reranking
            .as_ref()
            .map(RerankingModel::from)
            .unwrap_or_default();
        (None, model)
    } else {
        (Some(None), RerankingModel::default())
    };

    RetrievalModel {
        search_method: config.search_method,
        reranking_enable: config.reranking_enabled,
        reranking_mode,
        reranking_model,
        top_k: config.top_k,
        score_threshold_enabled: config.score_threshold_enabled,
        weights: config.weights,
        score_threshold: config.score_threshold,
    }
}

/// Retrieval model as sent with a retrieve query.
///
/// `reranking_mode` is always present: the provider/model pair when reranking
/// is enabled with both names non-empty, `null` otherwise.
pub fn build_retrieval_query_model(config: &RetrievalModelConfig) -> RetrievalModel {
    let active = config
        .reranking
        .as_ref()
        .filter(|r| config.reranking_enabled && !r.provider.is_empty() && !r.model.is_empty());

    let (reranking_mode, reranking_model) = match active {
        Some(r) => (Some(Some(RerankingModel::from(r))), RerankingModel::from(r)),
        None => (Some(None), RerankingModel::default()),
    };

    RetrievalModel {
        search_method: config.search_method,
        reranking_enable: config.reranking_enabled,
        reranking_mode,
        reranking_model,
        top_k: config.top_k,
        score_threshold_enabled: config.score_threshold_enabled,
        weights: config.weights,
        score_threshold: config.score_threshold,
    }
}

/// Override for datasets backed by an external knowledge API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalRetrievalModel {
    pub top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
    pub score_threshold_enabled: bool,
}

// ============ Process rule ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreProcessingRule {
    pub id: String,
    pub enabled: bool,
}

impl PreProcessingRule {
    pub fn new(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub separator: String,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<u32>,
}

impl Segmentation {
    pub fn new(separator: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            separator: separator.into(),
            max_tokens,
            chunk_overlap: None,
        }
    }
}

impl Default for Segmentation {
    /// A literal backslash-n separator (the remote side unescapes it) and
    /// 1000 tokens per segment.
    fn default() -> Self {
        Self::new("\\n", 1000)
    }
}

fn default_pre_processing_rules() -> Vec<PreProcessingRule> {
    vec![
        PreProcessingRule::new("remove_extra_spaces", true),
        PreProcessingRule::new("remove_urls_emails", true),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomRules {
    pub pre_processing_rules: Vec<PreProcessingRule>,
    pub segmentation: Segmentation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchicalRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subchunk_segmentation: Option<Segmentation>,
}

/// How raw document text is split into segments at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProcessRule {
    Automatic,
    Custom {
        rules: CustomRules,
    },
    Hierarchical {
        #[serde(skip_serializing_if = "Option::is_none")]
        rules: Option<HierarchicalRules>,
    },
}

impl Default for ProcessRule {
    fn default() -> Self {
        ProcessRule::Automatic
    }
}

/// Optional inputs for [`build_process_rule`]. Fields that do not apply to
/// the chosen mode are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRuleOptions {
    pub pre_processing_rules: Vec<PreProcessingRule>,
    pub segmentation: Option<Segmentation>,
    pub parent_mode: Option<String>,
    pub subchunk_segmentation: Option<Segmentation>,
}

/// Build a process rule for `mode`.
///
/// - `custom`: missing pre-processing rules become `remove_extra_spaces` +
///   `remove_urls_emails` (both enabled); missing segmentation becomes
///   [`Segmentation::default`].
/// - `hierarchical`: `rules` is emitted only if a parent mode or subchunk
///   segmentation was given.
/// - `automatic`: mode only.
pub fn build_process_rule(mode: ProcessMode, options: &ProcessRuleOptions) -> ProcessRule {
    match mode {
        ProcessMode::Automatic => ProcessRule::Automatic,
        ProcessMode::Custom => {
            let pre_processing_rules = if options.pre_processing_rules.is_empty() {
                default_pre_processing_rules()
            } else {
                options.pre_processing_rules.clone()
            };
            ProcessRule::Custom {
                rules: CustomRules {
                    pre_processing_rules,
                    segmentation: options.segmentation.clone().unwrap_or_default(),
                },
            }
        }
        ProcessMode::Hierarchical => {
            let parent_mode = non_empty(&options.parent_mode);
            let subchunk_segmentation = options.subchunk_segmentation.clone();
            let rules = if parent_mode.is_some() || subchunk_segmentation.is_some() {
                Some(HierarchicalRules {
                    parent_mode,
                    subchunk_segmentation,
                })
            } else {
                None
            };
            ProcessRule::Hierarchical { rules }
        }
    }
}

// ============ Datasets ============

/// Inputs for creating a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub name: String,
    pub permission: Permission,
    pub provider: String,
    pub description: Option<String>,
    pub indexing_technique: Option<IndexingTechnique>,
    pub external_knowledge_api_id: Option<String>,
    pub external_knowledge_id: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_model_provider: Option<String>,
    pub retrieval_model: Option<RetrievalModelConfig>,
}

impl DatasetSpec {
    /// A private (`only_me`), `vendor`-provided dataset with nothing else set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permission: Permission::default(),
            provider: "vendor".to_string(),
            description: None,
            indexing_technique: None,
            external_knowledge_api_id: None,
            external_knowledge_id: None,
            embedding_model: None,
            embedding_model_provider: None,
            retrieval_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetCreatePayload {
    pub name: String,
    pub permission: Permission,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_technique: Option<IndexingTechnique>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_knowledge_api_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_knowledge_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_model: Option<RetrievalModel>,
}

pub fn build_dataset_create(spec: &DatasetSpec) -> DatasetCreatePayload {
    DatasetCreatePayload {
        name: spec.name.clone(),
        permission: spec.permission,
        provider: spec.provider.clone(),
        description: non_empty(&spec.description),
        indexing_technique: spec.indexing_technique,
        external_knowledge_api_id: non_empty(&spec.external_knowledge_api_id),
        external_knowledge_id: non_empty(&spec.external_knowledge_id),
        embedding_model: non_empty(&spec.embedding_model),
        embedding_model_provider: non_empty(&spec.embedding_model_provider),
        retrieval_model: spec.retrieval_model.as_ref().map(build_retrieval_model),
    }
}

/// Sparse patch for a dataset. Unset fields are left unchanged remotely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetUpdateSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub indexing_technique: Option<IndexingTechnique>,
    pub permission: Option<Permission>,
    pub embedding_model_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub retrieval_model: Option<RetrievalModelConfig>,
    pub partial_member_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_technique: Option<IndexingTechnique>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_model: Option<RetrievalModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_member_list: Option<Vec<String>>,
}

/// Build a dataset patch. Empty strings count as "not supplied", so a field
/// cannot be cleared to `""` through this path.
pub fn build_dataset_update(spec: &DatasetUpdateSpec) -> DatasetUpdatePayload {
    DatasetUpdatePayload {
        name: non_empty(&spec.name),
        description: non_empty(&spec.description),
        indexing_technique: spec.indexing_technique,
        permission: spec.permission,
        embedding_model_provider: non_empty(&spec.embedding_model_provider),
        embedding_model: non_empty(&spec.embedding_model),
        retrieval_model: spec.retrieval_model.as_ref().map(build_retrieval_model),
        partial_member_list: spec.partial_member_list.clone(),
    }
}

// ============ Documents ============

/// Indexing settings shared by text and file ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexingOptions {
    pub indexing_technique: IndexingTechnique,
    /// Defaults to [`ProcessRule::Automatic`] when unset.
    pub process_rule: Option<ProcessRule>,
    pub doc_form: Option<DocForm>,
    /// Only meaningful with [`DocForm::Qa`].
    pub doc_language: Option<String>,
    pub retrieval_model: Option<RetrievalModelConfig>,
    pub embedding_model: Option<String>,
    pub embedding_model_provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDocumentSpec {
    pub name: String,
    pub text: String,
    pub options: IndexingOptions,
}

impl TextDocumentSpec {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            options: IndexingOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDocumentSpec {
    pub file_path: PathBuf,
    pub original_document_id: Option<String>,
    pub options: IndexingOptions,
}

impl FileDocumentSpec {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            original_document_id: None,
            options: IndexingOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexingPayload {
    pub indexing_technique: IndexingTechnique,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_form: Option<DocForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_language: Option<String>,
    pub process_rule: ProcessRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_model: Option<RetrievalModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model_provider: Option<String>,
}

fn build_indexing(options: &IndexingOptions) -> IndexingPayload {
    IndexingPayload {
        indexing_technique: options.indexing_technique,
        doc_form: options.doc_form,
        doc_language: non_empty(&options.doc_language),
        process_rule: options.process_rule.clone().unwrap_or_default(),
        retrieval_model: options.retrieval_model.as_ref().map(build_retrieval_model),
        embedding_model: non_empty(&options.embedding_model),
        embedding_model_provider: non_empty(&options.embedding_model_provider),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDocumentPayload {
    pub name: String,
    pub text: String,
    #[serde(flatten)]
    pub indexing: IndexingPayload,
}

pub fn build_document_from_text(spec: &TextDocumentSpec) -> TextDocumentPayload {
    TextDocumentPayload {
        name: spec.name.clone(),
        text: spec.text.clone(),
        indexing: build_indexing(&spec.options),
    }
}

/// Metadata sent as the `data` part of a file upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDocumentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_document_id: Option<String>,
    #[serde(flatten)]
    pub indexing: IndexingPayload,
}

pub fn build_document_from_file(spec: &FileDocumentSpec) -> FileDocumentPayload {
    FileDocumentPayload {
        original_document_id: non_empty(&spec.original_document_id),
        indexing: build_indexing(&spec.options),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDocumentUpdate {
    pub name: Option<String>,
    pub text: Option<String>,
    pub process_rule: Option<ProcessRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDocumentUpdate {
    pub file_path: PathBuf,
    pub name: Option<String>,
    pub process_rule: Option<ProcessRule>,
}

impl FileDocumentUpdate {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            name: None,
            process_rule: None,
        }
    }
}

/// Body for update-by-text, or the `data` part of update-by-file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_rule: Option<ProcessRule>,
}

pub fn build_document_text_update(spec: &TextDocumentUpdate) -> DocumentUpdatePayload {
    DocumentUpdatePayload {
        name: non_empty(&spec.name),
        text: non_empty(&spec.text),
        process_rule: spec.process_rule.clone(),
    }
}

pub fn build_document_file_update(spec: &FileDocumentUpdate) -> DocumentUpdatePayload {
    DocumentUpdatePayload {
        name: non_empty(&spec.name),
        text: None,
        process_rule: spec.process_rule.clone(),
    }
}

// ============ Segments ============

/// A segment to add to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// Build a segment, dropping an empty answer or keyword list.
pub fn build_segment(
    content: impl Into<String>,
    answer: Option<String>,
    keywords: Option<Vec<String>>,
) -> Segment {
    Segment {
        content: content.into(),
        answer: non_empty(&answer),
        keywords: non_empty_list(&keywords),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentsPayload {
    pub segments: Vec<Segment>,
}

/// Wrap a batch of segments, preserving order.
pub fn build_segments(segments: &[Segment]) -> SegmentsPayload {
    SegmentsPayload {
        segments: segments
            .iter()
            .map(|s| build_segment(s.content.clone(), s.answer.clone(), s.keywords.clone()))
            .collect(),
    }
}

/// Partial update of one segment. Each field is independent; `Some("")`
/// is sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regenerate_child_chunks: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentUpdatePayload {
    pub segment: SegmentUpdate,
}

pub fn build_segment_update(update: &SegmentUpdate) -> SegmentUpdatePayload {
    SegmentUpdatePayload {
        segment: update.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildChunkPayload {
    pub content: String,
}

// ============ Retrieval & metadata ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievePayload {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_model: Option<RetrievalModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_retrieval_model: Option<ExternalRetrievalModel>,
}

pub fn build_retrieve(
    query: &str,
    retrieval_model: Option<&RetrievalModelConfig>,
    external_retrieval_model: Option<&ExternalRetrievalModel>,
) -> RetrievePayload {
    RetrievePayload {
        query: query.to_string(),
        retrieval_model: retrieval_model.map(build_retrieval_query_model),
        external_retrieval_model: external_retrieval_model.cloned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataCreatePayload {
    #[serde(rename = "type")]
    pub metadata_type: MetadataType,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRenamePayload {
    pub name: String,
}

/// One metadata value to set on a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadataValue {
    pub id: String,
    pub value: Value,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadataOperation {
    pub document_id: String,
    pub metadata_list: Vec<DocumentMetadataValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadataPayload {
    pub operation_data: Vec<DocumentMetadataOperation>,
}

// ============ List queries ============

/// Page/limit pair used by every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    fn push_to(&self, query: &mut Vec<(&'static str, String)>) {
        query.push(("page", self.page.to_string()));
        query.push(("limit", self.limit.to_string()));
    }
}

fn push_keyword(query: &mut Vec<(&'static str, String)>, keyword: &Option<String>) {
    if let Some(k) = non_empty(keyword) {
        query.push(("keyword", k));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDatasetsQuery {
    pub keyword: Option<String>,
    pub tag_ids: Vec<String>,
    pub pagination: Pagination,
    pub include_all: bool,
}

impl ListDatasetsQuery {
    /// `tag_ids` is sent as repeated `tag_ids=` parameters.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        self.pagination.push_to(&mut query);
        query.push(("include_all", self.include_all.to_string()));
        push_keyword(&mut query, &self.keyword);
        for tag in &self.tag_ids {
            query.push(("tag_ids", tag.clone()));
        }
        query
    }
}

/// Keyword + pagination, used for documents and child chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub pagination: Pagination,
}

impl ListQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        self.pagination.push_to(&mut query);
        push_keyword(&mut query, &self.keyword);
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSegmentsQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub pagination: Pagination,
}

impl ListSegmentsQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        self.pagination.push_to(&mut query);
        push_keyword(&mut query, &self.keyword);
        if let Some(status) = non_empty(&self.status) {
            query.push(("status", status));
        }
        query
    }
}
