//! # dify-kb CLI
//!
//! The `dify-kb` binary drives a remote knowledge-base API from the shell:
//! knowledge bases, documents, segments, child chunks, retrieval, and
//! metadata.
//!
//! ## Usage
//!
//! ```bash
//! dify-kb [--config ./dify-kb.toml] [--dataset <id>] <command>
//! ```
//!
//! Credentials come from `--api-key`/`--base-url`, then `DIFY_API_KEY`/
//! `DIFY_BASE_URL`, then the `[api]` table of the config file.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dify-kb kb ...` | List, inspect, create, update, and delete knowledge bases |
//! | `dify-kb doc ...` | Ingest documents from text or files, track indexing |
//! | `dify-kb segment ...` | Manage the segments of a document |
//! | `dify-kb child ...` | Manage child chunks of a segment |
//! | `dify-kb retrieve "<query>"` | Query a knowledge base |
//! | `dify-kb metadata ...` | Metadata fields and per-document values |
//! | `dify-kb completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Create a knowledge base and add a document
//! dify-kb kb create "Product Docs" --indexing-technique high_quality
//! dify-kb --dataset <id> doc create-text --name faq --text-file ./faq.md
//!
//! # Custom chunking
//! dify-kb --dataset <id> doc create-file ./manual.pdf --process-mode custom --max-tokens 500
//!
//! # Hybrid retrieval with a reranker
//! dify-kb --dataset <id> retrieve "reset password" --search-method hybrid_search \
//!     --rerank --rerank-provider cohere --rerank-model rerank-english-v3.0
//! ```

mod commands;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use dify_kb::config;
use dify_kb::payload::{
    build_dataset_update, build_process_rule, build_segment, DatasetSpec, DatasetUpdatePayload,
    DatasetUpdateSpec, DocForm,
    DocumentMetadataOperation, DocumentMetadataValue, ExternalRetrievalModel, FileDocumentSpec,
    FileDocumentUpdate, IndexingOptions, IndexingTechnique, ListDatasetsQuery, ListQuery,
    ListSegmentsQuery, MetadataType, Permission, PreProcessingRule, ProcessMode, ProcessRule,
    ProcessRuleOptions, Reranker, RetrievalModelConfig, SearchMethod, Segment, SegmentUpdate,
    Segmentation, TextDocumentSpec, TextDocumentUpdate,
};
use dify_kb::Client;

use commands::Session;

const DEFAULT_CONFIG_PATH: &str = "./dify-kb.toml";

/// Command-line client for a Dify knowledge-base (RAG) API.
#[derive(Parser)]
#[command(
    name = "dify-kb",
    about = "Manage Dify knowledge bases, documents, segments, and retrieval from the shell",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./dify-kb.toml`; a missing default file is ignored, a
    /// missing explicit one is an error.
    #[arg(long, global = true, env = "DIFY_KB_CONFIG")]
    config: Option<PathBuf>,

    /// API key (dataset key).
    #[arg(long, global = true, env = "DIFY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL, e.g. `https://api.dify.ai/v1`.
    #[arg(long, global = true, env = "DIFY_BASE_URL")]
    base_url: Option<String>,

    /// Knowledge base to act on when a command does not name one.
    #[arg(long, global = true, env = "DIFY_DATASET_ID")]
    dataset: Option<String>,

    /// Print raw JSON responses instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Log requests and responses to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Knowledge base (dataset) management.
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },

    /// Document ingestion and lifecycle.
    Doc {
        #[command(subcommand)]
        action: DocAction,
    },

    /// Segments of a document.
    Segment {
        #[command(subcommand)]
        action: SegmentAction,
    },

    /// Child chunks of a segment (hierarchical documents).
    Child {
        #[command(subcommand)]
        action: ChildAction,
    },

    /// Retrieve segments relevant to a query.
    ///
    /// Without retrieval flags the knowledge base's own settings apply.
    Retrieve {
        /// Query text.
        query: String,

        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// top_k for knowledge bases backed by an external knowledge API.
        #[arg(long)]
        external_top_k: Option<u32>,

        /// Score threshold for the external knowledge API.
        #[arg(long, requires = "external_top_k")]
        external_score_threshold: Option<f64>,
    },

    /// Metadata fields and document metadata values.
    Metadata {
        #[command(subcommand)]
        action: MetadataAction,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum KbAction {
    /// List knowledge bases.
    List {
        /// Filter by name.
        #[arg(long)]
        keyword: Option<String>,

        /// Filter by tag id (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Include knowledge bases shared with the workspace.
        #[arg(long)]
        include_all: bool,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one knowledge base.
    Get {
        /// Knowledge base id (defaults to --dataset).
        id: Option<String>,
    },

    /// Create a knowledge base.
    Create {
        /// Display name.
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        indexing_technique: Option<IndexingTechnique>,

        #[arg(long, default_value = "only_me")]
        permission: Permission,

        /// `vendor` for local storage, `external` for an external knowledge API.
        #[arg(long, default_value = "vendor")]
        provider: String,

        #[arg(long)]
        external_knowledge_api_id: Option<String>,

        #[arg(long)]
        external_knowledge_id: Option<String>,

        #[arg(long)]
        embedding_model: Option<String>,

        #[arg(long)]
        embedding_provider: Option<String>,

        #[command(flatten)]
        retrieval: RetrievalArgs,
    },

    /// Update knowledge base settings. Only the given fields change.
    Update {
        /// Knowledge base id (defaults to --dataset).
        id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        indexing_technique: Option<IndexingTechnique>,

        #[arg(long)]
        permission: Option<Permission>,

        #[arg(long)]
        embedding_model: Option<String>,

        #[arg(long)]
        embedding_provider: Option<String>,

        /// Member allowed access with `partial_members` permission (repeatable).
        #[arg(long = "member")]
        members: Vec<String>,

        #[command(flatten)]
        retrieval: RetrievalArgs,
    },

    /// Delete a knowledge base and all its documents.
    Delete {
        /// Knowledge base id (defaults to --dataset).
        id: Option<String>,

        /// Skip the safety check.
        #[arg(long)]
        yes: bool,
    },

    /// List available text-embedding models.
    Models,
}

#[derive(Subcommand)]
enum DocAction {
    /// List documents in the knowledge base.
    List {
        #[arg(long)]
        keyword: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Create a document from text.
    CreateText {
        #[arg(long)]
        name: String,

        /// Document text.
        #[arg(long, required_unless_present = "text_file", conflicts_with = "text_file")]
        text: Option<String>,

        /// Read the document text from a file.
        #[arg(long)]
        text_file: Option<PathBuf>,

        #[command(flatten)]
        indexing: IndexingArgs,
    },

    /// Create a document by uploading a file.
    CreateFile {
        /// File to upload.
        path: PathBuf,

        /// Replace this existing document instead of adding a new one.
        #[arg(long)]
        original_document_id: Option<String>,

        #[command(flatten)]
        indexing: IndexingArgs,
    },

    /// Replace a document's name, text, or chunking.
    UpdateText {
        document: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,

        #[arg(long)]
        text_file: Option<PathBuf>,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// Replace a document's content with a file.
    UpdateFile {
        document: String,

        path: PathBuf,

        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// Delete a document.
    Delete {
        document: String,

        #[arg(long)]
        yes: bool,
    },

    /// Show indexing progress for a batch returned by a create/update.
    Status { batch: String },

    /// Show the file a document was created from.
    UploadFile { document: String },
}

#[derive(Subcommand)]
enum SegmentAction {
    /// List segments of a document.
    List {
        document: String,

        #[arg(long)]
        keyword: Option<String>,

        /// Filter by indexing status, e.g. `completed`.
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Add segments to a document.
    Add {
        document: String,

        /// Segment content.
        #[arg(long, required_unless_present = "from_json", conflicts_with = "from_json")]
        content: Option<String>,

        /// Answer (Q&A documents).
        #[arg(long)]
        answer: Option<String>,

        /// Keyword (repeatable).
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Read a JSON array of `{content, answer?, keywords?}` objects.
        #[arg(long)]
        from_json: Option<PathBuf>,
    },

    /// Update one segment.
    Update {
        document: String,

        segment: String,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        answer: Option<String>,

        /// Keyword (repeatable); replaces the existing list.
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        #[arg(long)]
        enabled: Option<bool>,

        /// Regenerate child chunks after the content changes.
        #[arg(long)]
        regenerate_child_chunks: bool,
    },

    /// Delete one segment.
    Delete { document: String, segment: String },
}

#[derive(Subcommand)]
enum ChildAction {
    /// List child chunks of a segment.
    List {
        document: String,

        segment: String,

        #[arg(long)]
        keyword: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Add a child chunk.
    Create {
        document: String,
        segment: String,
        #[arg(long)]
        content: String,
    },

    /// Replace a child chunk's content.
    Update {
        document: String,
        segment: String,
        child: String,
        #[arg(long)]
        content: String,
    },

    /// Delete a child chunk.
    Delete {
        document: String,
        segment: String,
        child: String,
    },
}

#[derive(Subcommand)]
enum MetadataAction {
    /// List metadata fields of the knowledge base.
    List,

    /// Create a metadata field.
    Create {
        name: String,

        #[arg(long = "type", default_value = "string")]
        field_type: MetadataType,
    },

    /// Rename a metadata field.
    Update { metadata_id: String, name: String },

    /// Delete a metadata field.
    Delete { metadata_id: String },

    /// Enable or disable built-in metadata fields (`enable` | `disable`).
    Builtin { action: String },

    /// Set metadata values on a document.
    SetDoc {
        document: String,

        /// `ID:NAME=VALUE` (repeatable).
        #[arg(long = "value", required = true, value_parser = parse_metadata_value)]
        values: Vec<DocumentMetadataValue>,
    },
}

#[derive(Args, Default)]
struct PageArgs {
    #[arg(long)]
    page: Option<u32>,

    /// Page size (defaults to `[defaults].page_size`).
    #[arg(long)]
    limit: Option<u32>,
}

/// Retrieval settings. All optional; nothing set means "no override".
#[derive(Args, Default)]
struct RetrievalArgs {
    #[arg(long)]
    search_method: Option<SearchMethod>,

    #[arg(long)]
    top_k: Option<u32>,

    /// Enable reranking.
    #[arg(long)]
    rerank: bool,

    #[arg(long, requires = "rerank_model")]
    rerank_provider: Option<String>,

    #[arg(long, requires = "rerank_provider")]
    rerank_model: Option<String>,

    /// Semantic weight for hybrid search, 0.0 to 1.0.
    #[arg(long)]
    weights: Option<f64>,

    /// Drop results scoring below this value.
    #[arg(long)]
    score_threshold: Option<f64>,
}

impl RetrievalArgs {
    fn to_config(&self) -> Option<RetrievalModelConfig> {
        let any_set = self.search_method.is_some()
            || self.top_k.is_some()
            || self.rerank
            || self.rerank_provider.is_some()
            || self.weights.is_some()
            || self.score_threshold.is_some();
        if !any_set {
            return None;
        }

        let defaults = RetrievalModelConfig::default();
        let reranking = match (&self.rerank_provider, &self.rerank_model) {
            (Some(provider), Some(model)) => Some(Reranker::new(provider, model)),
            _ => None,
        };
        Some(RetrievalModelConfig {
            search_method: self.search_method.unwrap_or(defaults.search_method),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            reranking_enabled: self.rerank,
            reranking,
            weights: self.weights,
            score_threshold_enabled: self.score_threshold.is_some(),
            score_threshold: self.score_threshold,
        })
    }
}

/// Chunking settings. `--process-mode` switches them on.
#[derive(Args, Default)]
struct ProcessArgs {
    #[arg(long)]
    process_mode: Option<ProcessMode>,

    /// Segment separator (custom mode), default `\n`.
    #[arg(long)]
    separator: Option<String>,

    /// Max tokens per segment (custom mode), default 1000.
    #[arg(long)]
    max_tokens: Option<u32>,

    #[arg(long)]
    chunk_overlap: Option<u32>,

    /// Pre-processing rule, `ID` or `ID=true|false` (repeatable).
    #[arg(long = "pre-rule", value_parser = parse_pre_rule)]
    pre_rules: Vec<PreProcessingRule>,

    /// Parent chunk mode (hierarchical), e.g. `paragraph` or `full-doc`.
    #[arg(long)]
    parent_mode: Option<String>,

    #[arg(long)]
    subchunk_separator: Option<String>,

    #[arg(long)]
    subchunk_max_tokens: Option<u32>,
}

impl ProcessArgs {
    fn to_rule(&self) -> Option<ProcessRule> {
        let mode = self.process_mode?;
        let defaults = Segmentation::default();

        let segmentation = if self.separator.is_some()
            || self.max_tokens.is_some()
            || self.chunk_overlap.is_some()
        {
            let mut seg = Segmentation::new(
                self.separator.clone().unwrap_or(defaults.separator.clone()),
                self.max_tokens.unwrap_or(defaults.max_tokens),
            );
            seg.chunk_overlap = self.chunk_overlap;
            Some(seg)
        } else {
            None
        };

        let subchunk_segmentation =
            if self.subchunk_separator.is_some() || self.subchunk_max_tokens.is_some() {
                Some(Segmentation::new(
                    self.subchunk_separator
                        .clone()
                        .unwrap_or(defaults.separator.clone()),
                    self.subchunk_max_tokens.unwrap_or(defaults.max_tokens),
                ))
            } else {
                None
            };

        let options = ProcessRuleOptions {
            pre_processing_rules: self.pre_rules.clone(),
            segmentation,
            parent_mode: self.parent_mode.clone(),
            subchunk_segmentation,
        };
        Some(build_process_rule(mode, &options))
    }
}

/// Settings for creating a document.
#[derive(Args, Default)]
struct IndexingArgs {
    #[arg(long, default_value = "high_quality")]
    indexing_technique: IndexingTechnique,

    #[arg(long)]
    doc_form: Option<DocForm>,

    /// Language for Q&A generation, e.g. `English`.
    #[arg(long)]
    doc_language: Option<String>,

    #[arg(long)]
    embedding_model: Option<String>,

    #[arg(long)]
    embedding_provider: Option<String>,

    #[command(flatten)]
    process: ProcessArgs,

    #[command(flatten)]
    retrieval: RetrievalArgs,
}

impl IndexingArgs {
    fn to_options(&self) -> IndexingOptions {
        IndexingOptions {
            indexing_technique: self.indexing_technique,
            process_rule: self.process.to_rule(),
            doc_form: self.doc_form,
            doc_language: self.doc_language.clone(),
            retrieval_model: self.retrieval.to_config(),
            embedding_model: self.embedding_model.clone(),
            embedding_model_provider: self.embedding_provider.clone(),
        }
    }
}

/// Parse `ID` or `ID=true|false`.
fn parse_pre_rule(s: &str) -> Result<PreProcessingRule, String> {
    match s.split_once('=') {
        None => Ok(PreProcessingRule::new(s, true)),
        Some((id, enabled)) => {
            let enabled: bool = enabled
                .parse()
                .map_err(|_| format!("expected ID=true|false, got: {}", s))?;
            Ok(PreProcessingRule::new(id, enabled))
        }
    }
}

/// Parse `ID:NAME=VALUE`. Numeric values are sent as JSON numbers.
fn parse_metadata_value(s: &str) -> Result<DocumentMetadataValue, String> {
    let (field, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID:NAME=VALUE, got: {}", s))?;
    let (id, name) = field
        .split_once(':')
        .ok_or_else(|| format!("expected ID:NAME=VALUE, got: {}", s))?;
    if id.is_empty() || name.is_empty() {
        return Err(format!("expected ID:NAME=VALUE, got: {}", s));
    }

    let value = serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_number)
        .unwrap_or_else(|| Value::String(raw.to_string()));
    Ok(DocumentMetadataValue {
        id: id.to_string(),
        value,
        name: name.to_string(),
    })
}

/// True when the patch would go out as `{}` (empty strings are dropped).
fn is_empty_update(spec: &DatasetUpdateSpec) -> bool {
    build_dataset_update(spec) == DatasetUpdatePayload::default()
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "dify_kb=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_session(cli: &Cli) -> Result<Session> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let cfg = config::load_config(&path, cli.config.is_some())?;

    let credentials =
        config::resolve_credentials(cli.api_key.as_deref(), cli.base_url.as_deref(), &cfg)?;
    let client = Client::with_timeout(credentials, cfg.api.timeout_secs.map(Duration::from_secs))?;

    Ok(Session {
        client,
        dataset_id: cli.dataset.clone().or(cfg.defaults.dataset_id),
        page_size: cfg.defaults.page_size,
        json: cli.json,
    })
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read text file: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Commands that don't need credentials
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "dify-kb", &mut std::io::stdout());
        return Ok(());
    }

    let session = open_session(&cli)?;

    match cli.command {
        Commands::Kb { action } => run_kb(&session, action).await,
        Commands::Doc { action } => run_doc(&session, action).await,
        Commands::Segment { action } => run_segment(&session, action).await,
        Commands::Child { action } => run_child(&session, action).await,
        Commands::Retrieve {
            query,
            retrieval,
            external_top_k,
            external_score_threshold,
        } => {
            let dataset = session.dataset(None)?;
            let external = external_top_k.map(|top_k| ExternalRetrievalModel {
                top_k,
                score_threshold: external_score_threshold,
                score_threshold_enabled: external_score_threshold.is_some(),
            });
            let value = session
                .client
                .retrieval()
                .retrieve(&dataset, &query, retrieval.to_config().as_ref(), external.as_ref())
                .await?;
            session.emit(&value, commands::print_retrieval)
        }
        Commands::Metadata { action } => run_metadata(&session, action).await,
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_kb(session: &Session, action: KbAction) -> Result<()> {
    let kb = session.client.knowledge_bases();
    match action {
        KbAction::List {
            keyword,
            tags,
            include_all,
            page,
        } => {
            let query = ListDatasetsQuery {
                keyword,
                tag_ids: tags,
                pagination: session.pagination(page.page, page.limit),
                include_all,
            };
            let value = kb.list(&query).await?;
            session.emit(&value, commands::print_datasets)
        }
        KbAction::Get { id } => {
            let id = session.dataset(id.as_deref())?;
            let value = kb.get(&id).await?;
            session.emit(&value, commands::print_dataset)
        }
        KbAction::Create {
            name,
            description,
            indexing_technique,
            permission,
            provider,
            external_knowledge_api_id,
            external_knowledge_id,
            embedding_model,
            embedding_provider,
            retrieval,
        } => {
            let mut spec = DatasetSpec::new(name);
            spec.description = description;
            spec.indexing_technique = indexing_technique;
            spec.permission = permission;
            spec.provider = provider;
            spec.external_knowledge_api_id = external_knowledge_api_id;
            spec.external_knowledge_id = external_knowledge_id;
            spec.embedding_model = embedding_model;
            spec.embedding_model_provider = embedding_provider;
            spec.retrieval_model = retrieval.to_config();
            let value = kb.create(&spec).await?;
            session.emit(&value, commands::print_dataset)
        }
        KbAction::Update {
            id,
            name,
            description,
            indexing_technique,
            permission,
            embedding_model,
            embedding_provider,
            members,
            retrieval,
        } => {
            let id = session.dataset(id.as_deref())?;
            let spec = DatasetUpdateSpec {
                name,
                description,
                indexing_technique,
                permission,
                embedding_model_provider: embedding_provider,
                embedding_model,
                retrieval_model: retrieval.to_config(),
                partial_member_list: if members.is_empty() { None } else { Some(members) },
            };
            if is_empty_update(&spec) {
                bail!("Nothing to update. Pass at least one field flag.");
            }
            let value = kb.update(&id, &spec).await?;
            session.emit(&value, commands::print_dataset)
        }
        KbAction::Delete { id, yes } => {
            let id = session.dataset(id.as_deref())?;
            if !yes {
                bail!(
                    "Refusing to delete knowledge base {} and all its documents without --yes",
                    id
                );
            }
            let value = kb.delete(&id).await?;
            session.emit(&value, commands::print_ack)
        }
        KbAction::Models => {
            let value = kb.embedding_models().await?;
            session.emit(&value, commands::print_embedding_models)
        }
    }
}

async fn run_doc(session: &Session, action: DocAction) -> Result<()> {
    let dataset = session.dataset(None)?;
    let docs = session.client.documents();
    match action {
        DocAction::List { keyword, page } => {
            let query = ListQuery {
                keyword,
                pagination: session.pagination(page.page, page.limit),
            };
            let value = docs.list(&dataset, &query).await?;
            session.emit(&value, commands::print_documents)
        }
        DocAction::CreateText {
            name,
            text,
            text_file,
            indexing,
        } => {
            let text = match (text, text_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text(&path)?,
                (None, None) => bail!("Pass --text or --text-file"),
            };
            let mut spec = TextDocumentSpec::new(name, text);
            spec.options = indexing.to_options();
            let value = docs.create_from_text(&dataset, &spec).await?;
            session.emit(&value, commands::print_document_created)
        }
        DocAction::CreateFile {
            path,
            original_document_id,
            indexing,
        } => {
            let mut spec = FileDocumentSpec::new(path);
            spec.original_document_id = original_document_id;
            spec.options = indexing.to_options();
            let value = docs.create_from_file(&dataset, &spec).await?;
            session.emit(&value, commands::print_document_created)
        }
        DocAction::UpdateText {
            document,
            name,
            text,
            text_file,
            process,
        } => {
            let text = match (text, text_file) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => Some(read_text(&path)?),
                (None, None) => None,
            };
            let spec = TextDocumentUpdate {
                name,
                text,
                process_rule: process.to_rule(),
            };
            let value = docs.update_by_text(&dataset, &document, &spec).await?;
            session.emit(&value, commands::print_document_created)
        }
        DocAction::UpdateFile {
            document,
            path,
            name,
            process,
        } => {
            let mut spec = FileDocumentUpdate::new(path);
            spec.name = name;
            spec.process_rule = process.to_rule();
            let value = docs.update_by_file(&dataset, &document, &spec).await?;
            session.emit(&value, commands::print_document_created)
        }
        DocAction::Delete { document, yes } => {
            if !yes {
                bail!("Refusing to delete document {} without --yes", document);
            }
            let value = docs.delete(&dataset, &document).await?;
            session.emit(&value, commands::print_ack)
        }
        DocAction::Status { batch } => {
            let value = docs.indexing_status(&dataset, &batch).await?;
            session.emit(&value, commands::print_indexing_status)
        }
        DocAction::UploadFile { document } => {
            let value = docs.upload_file(&dataset, &document).await?;
            session.emit(&value, commands::print_value)
        }
    }
}

async fn run_segment(session: &Session, action: SegmentAction) -> Result<()> {
    let dataset = session.dataset(None)?;
    let segments = session.client.segments();
    match action {
        SegmentAction::List {
            document,
            keyword,
            status,
            page,
        } => {
            let query = ListSegmentsQuery {
                keyword,
                status,
                pagination: session.pagination(page.page, page.limit),
            };
            let value = segments.list(&dataset, &document, &query).await?;
            session.emit(&value, commands::print_segments)
        }
        SegmentAction::Add {
            document,
            content,
            answer,
            keywords,
            from_json,
        } => {
            let batch: Vec<Segment> = match (content, from_json) {
                (Some(content), _) => vec![build_segment(content, answer, Some(keywords))],
                (None, Some(path)) => {
                    let raw = read_text(&path)?;
                    serde_json::from_str(&raw).with_context(|| {
                        format!("Failed to parse segments from {}", path.display())
                    })?
                }
                (None, None) => bail!("Pass --content or --from-json"),
            };
            if batch.is_empty() {
                bail!("No segments to add");
            }
            let value = segments.add(&dataset, &document, &batch).await?;
            session.emit(&value, commands::print_segments)
        }
        SegmentAction::Update {
            document,
            segment,
            content,
            answer,
            keywords,
            enabled,
            regenerate_child_chunks,
        } => {
            let update = SegmentUpdate {
                content,
                answer,
                keywords: if keywords.is_empty() { None } else { Some(keywords) },
                enabled,
                regenerate_child_chunks: regenerate_child_chunks.then_some(true),
            };
            let value = segments.update(&dataset, &document, &segment, &update).await?;
            session.emit(&value, commands::print_value)
        }
        SegmentAction::Delete { document, segment } => {
            let value = segments.delete(&dataset, &document, &segment).await?;
            session.emit(&value, commands::print_ack)
        }
    }
}

async fn run_child(session: &Session, action: ChildAction) -> Result<()> {
    let dataset = session.dataset(None)?;
    let segments = session.client.segments();
    match action {
        ChildAction::List {
            document,
            segment,
            keyword,
            page,
        } => {
            let query = ListQuery {
                keyword,
                pagination: session.pagination(page.page, page.limit),
            };
            let value = segments
                .list_child_chunks(&dataset, &document, &segment, &query)
                .await?;
            session.emit(&value, commands::print_child_chunks)
        }
        ChildAction::Create {
            document,
            segment,
            content,
        } => {
            let value = segments
                .create_child_chunk(&dataset, &document, &segment, &content)
                .await?;
            session.emit(&value, commands::print_value)
        }
        ChildAction::Update {
            document,
            segment,
            child,
            content,
        } => {
            let value = segments
                .update_child_chunk(&dataset, &document, &segment, &child, &content)
                .await?;
            session.emit(&value, commands::print_value)
        }
        ChildAction::Delete {
            document,
            segment,
            child,
        } => {
            let value = segments
                .delete_child_chunk(&dataset, &document, &segment, &child)
                .await?;
            session.emit(&value, commands::print_ack)
        }
    }
}

async fn run_metadata(session: &Session, action: MetadataAction) -> Result<()> {
    let dataset = session.dataset(None)?;
    let retrieval = session.client.retrieval();
    match action {
        MetadataAction::List => {
            let value = retrieval.list_metadata(&dataset).await?;
            session.emit(&value, commands::print_metadata)
        }
        MetadataAction::Create { name, field_type } => {
            let value = retrieval.create_metadata(&dataset, field_type, &name).await?;
            session.emit(&value, commands::print_value)
        }
        MetadataAction::Update { metadata_id, name } => {
            let value = retrieval
                .update_metadata(&dataset, &metadata_id, &name)
                .await?;
            session.emit(&value, commands::print_value)
        }
        MetadataAction::Delete { metadata_id } => {
            let value = retrieval.delete_metadata(&dataset, &metadata_id).await?;
            session.emit(&value, commands::print_ack)
        }
        MetadataAction::Builtin { action } => {
            let value = retrieval.toggle_builtin_metadata(&dataset, &action).await?;
            session.emit(&value, commands::print_ack)
        }
        MetadataAction::SetDoc { document, values } => {
            let operation = DocumentMetadataOperation {
                document_id: document,
                metadata_list: values,
            };
            let value = retrieval
                .update_documents_metadata(&dataset, &[operation])
                .await?;
            session.emit(&value, commands::print_ack)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pre_rule() {
        let rule = parse_pre_rule("remove_urls_emails").unwrap();
        assert_eq!(rule, PreProcessingRule::new("remove_urls_emails", true));
        let rule = parse_pre_rule("remove_extra_spaces=false").unwrap();
        assert_eq!(rule, PreProcessingRule::new("remove_extra_spaces", false));
        assert!(parse_pre_rule("remove_extra_spaces=maybe").is_err());
    }

    #[test]
    fn test_parse_metadata_value() {
        let v = parse_metadata_value("m1:author=Ada").unwrap();
        assert_eq!(v.id, "m1");
        assert_eq!(v.name, "author");
        assert_eq!(v.value, Value::String("Ada".into()));

        let v = parse_metadata_value("m2:pages=42").unwrap();
        assert_eq!(v.value, serde_json::json!(42));

        assert!(parse_metadata_value("author=Ada").is_err());
        assert!(parse_metadata_value("m1:author").is_err());
    }

    #[test]
    fn test_retrieval_args_unset_means_no_override() {
        assert!(RetrievalArgs::default().to_config().is_none());
    }

    #[test]
    fn test_retrieval_args_fill_defaults() {
        let args = RetrievalArgs {
            search_method: Some(SearchMethod::Hybrid),
            rerank: true,
            rerank_provider: Some("cohere".into()),
            rerank_model: Some("rerank-v3".into()),
            ..Default::default()
        };
        let cfg = args.to_config().unwrap();
        assert_eq!(cfg.top_k, 2);
        assert!(cfg.reranking_enabled);
        assert_eq!(cfg.reranking, Some(Reranker::new("cohere", "rerank-v3")));
        assert!(!cfg.score_threshold_enabled);
    }

    #[test]
    fn test_process_args_custom_defaults() {
        let args = ProcessArgs {
            process_mode: Some(ProcessMode::Custom),
            max_tokens: Some(500),
            ..Default::default()
        };
        let rule = args.to_rule().unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["mode"], "custom");
        assert_eq!(json["rules"]["segmentation"]["separator"], "\\n");
        assert_eq!(json["rules"]["segmentation"]["max_tokens"], 500);
        assert_eq!(
            json["rules"]["pre_processing_rules"].as_array().unwrap().len(),
            2
        );
    }

    #[test]
    fn test_empty_strings_make_an_empty_update() {
        let spec = DatasetUpdateSpec {
            description: Some(String::new()),
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(is_empty_update(&spec));
        assert!(is_empty_update(&DatasetUpdateSpec::default()));

        let spec = DatasetUpdateSpec {
            description: Some("notes".into()),
            ..Default::default()
        };
        assert!(!is_empty_update(&spec));
    }

    #[test]
    fn test_process_args_without_mode() {
        let args = ProcessArgs {
            max_tokens: Some(500),
            ..Default::default()
        };
        assert!(args.to_rule().is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dify-kb", "kb", "get", "--dataset", "ds-1", "--json", "--api-key", "k",
            "--base-url", "http://localhost:1",
        ])
        .unwrap();
        assert_eq!(cli.dataset.as_deref(), Some("ds-1"));
        assert!(cli.json);
    }

    #[test]
    fn test_unknown_search_method_rejected() {
        let result = Cli::try_parse_from([
            "dify-kb", "retrieve", "q", "--search-method", "vector_search",
        ]);
        assert!(result.is_err());
    }
}
