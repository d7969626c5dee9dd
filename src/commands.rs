//! CLI session and output rendering.
//!
//! Handlers in `main.rs` call a manager, then hand the parsed body to one of
//! the `print_*` functions here via [`Session::emit`]. With `--json` the body
//! is printed as-is instead.

use anyhow::{bail, Result};
use serde_json::Value;

use dify_kb::models::{
    parse, ChildChunk, Dataset, DocumentCreated, DocumentInfo, EmbeddingProvider, IndexingStatus,
    MetadataList, Page, RetrievalResult, SegmentInfo,
};
use dify_kb::payload::Pagination;
use dify_kb::Client;

/// Everything a command needs: the client plus the default dataset and
/// output settings.
pub struct Session {
    pub client: Client,
    pub dataset_id: Option<String>,
    pub page_size: u32,
    pub json: bool,
}

impl Session {
    /// The dataset to act on: an explicit argument wins over the session default.
    pub fn dataset(&self, explicit: Option<&str>) -> Result<String> {
        match explicit.or(self.dataset_id.as_deref()) {
            Some(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            _ => bail!(
                "No dataset selected. Pass --dataset, set DIFY_DATASET_ID, or set [defaults].dataset_id."
            ),
        }
    }

    pub fn pagination(&self, page: Option<u32>, limit: Option<u32>) -> Pagination {
        Pagination {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(self.page_size),
        }
    }

    /// Print `value` with `render`, or as pretty JSON under `--json`.
    pub fn emit(&self, value: &Value, render: fn(&Value) -> Result<()>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        } else {
            render(value)
        }
    }
}

/// Acknowledgement for mutations: prints the body's `result` (or `ok`).
pub fn print_ack(value: &Value) -> Result<()> {
    let status = value
        .get("result")
        .and_then(Value::as_str)
        .unwrap_or("ok");
    println!("{}", status);
    Ok(())
}

/// Fallback renderer for bodies without a dedicated table.
pub fn print_value(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_datasets(value: &Value) -> Result<()> {
    let page: Page<Dataset> = parse(value)?;
    if page.data.is_empty() {
        println!("No knowledge bases found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<28} {:>6} {:>8}  {:<18} {}",
        "ID", "NAME", "DOCS", "WORDS", "PERMISSION", "INDEXING"
    );
    for ds in &page.data {
        println!(
            "{:<36}  {:<28} {:>6} {:>8}  {:<18} {}",
            ds.id,
            truncate(&ds.name, 28),
            ds.document_count,
            ds.word_count,
            ds.permission.as_deref().unwrap_or("N/A"),
            ds.indexing_technique.as_deref().unwrap_or("N/A"),
        );
    }
    print_page_footer(page.page, page.limit, page.total);
    Ok(())
}

pub fn print_dataset(value: &Value) -> Result<()> {
    let ds: Dataset = parse(value)?;
    println!("--- Knowledge Base ---");
    println!("id:           {}", ds.id);
    println!("name:         {}", ds.name);
    println!(
        "description:  {}",
        ds.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("(none)")
    );
    println!("permission:   {}", ds.permission.as_deref().unwrap_or("N/A"));
    println!(
        "indexing:     {}",
        ds.indexing_technique.as_deref().unwrap_or("N/A")
    );
    if let Some(ref model) = ds.embedding_model {
        println!(
            "embedding:    {} ({})",
            model,
            ds.embedding_model_provider.as_deref().unwrap_or("?")
        );
    }
    println!("documents:    {}", ds.document_count);
    println!("words:        {}", ds.word_count);
    if let Some(ts) = ds.created_at {
        println!("created_at:   {}", format_ts_iso(ts));
    }
    Ok(())
}

pub fn print_embedding_models(value: &Value) -> Result<()> {
    let page: Page<EmbeddingProvider> = parse(value)?;
    if page.data.is_empty() {
        println!("No embedding models available.");
        return Ok(());
    }
    println!("{:<24} MODEL", "PROVIDER");
    for provider in &page.data {
        for model in &provider.models {
            println!("{:<24} {}", provider.provider, model.model);
        }
    }
    Ok(())
}

pub fn print_documents(value: &Value) -> Result<()> {
    let page: Page<DocumentInfo> = parse(value)?;
    if page.data.is_empty() {
        println!("No documents found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<32} {:<12} {:>8} {:<8} {}",
        "ID", "NAME", "STATUS", "WORDS", "ENABLED", "CREATED"
    );
    for doc in &page.data {
        println!(
            "{:<36}  {:<32} {:<12} {:>8} {:<8} {}",
            doc.id,
            truncate(&doc.name, 32),
            doc.indexing_status.as_deref().unwrap_or("-"),
            doc.word_count.unwrap_or(0),
            doc.enabled.map(|e| e.to_string()).unwrap_or_else(|| "-".to_string()),
            doc.created_at.map(format_ts_iso).unwrap_or_default(),
        );
    }
    print_page_footer(page.page, page.limit, page.total);
    Ok(())
}

pub fn print_document_created(value: &Value) -> Result<()> {
    let created: DocumentCreated = parse(value)?;
    println!("document: {} ({})", created.document.id, created.document.name);
    println!("batch:    {}", created.batch);
    if !created.batch.is_empty() {
        println!("Check progress with: dify-kb doc status {}", created.batch);
    }
    Ok(())
}

pub fn print_indexing_status(value: &Value) -> Result<()> {
    let page: Page<IndexingStatus> = parse(value)?;
    println!("{:<36}  {:<12} SEGMENTS", "DOCUMENT", "STATUS");
    for status in &page.data {
        println!(
            "{:<36}  {:<12} {} / {}",
            status.id, status.indexing_status, status.completed_segments, status.total_segments
        );
        if let Some(ref err) = status.error {
            println!("    error: {}", err);
        }
    }
    Ok(())
}

pub fn print_segments(value: &Value) -> Result<()> {
    let page: Page<SegmentInfo> = parse(value)?;
    if page.data.is_empty() {
        println!("No segments found.");
        return Ok(());
    }

    for seg in &page.data {
        println!(
            "[{}] {}  status={} enabled={} words={} hits={}",
            seg.position.unwrap_or(0),
            seg.id,
            seg.status.as_deref().unwrap_or("-"),
            seg.enabled.unwrap_or(true),
            seg.word_count.unwrap_or(0),
            seg.hit_count.unwrap_or(0),
        );
        println!("    {}", truncate(&seg.content, 200));
        if let Some(answer) = seg.answer.as_ref().filter(|a| !a.is_empty()) {
            println!("    answer: {}", truncate(answer, 200));
        }
        if let Some(keywords) = seg.keywords.as_ref().filter(|k| !k.is_empty()) {
            println!("    keywords: {}", keywords.join(", "));
        }
    }
    print_page_footer(page.page, page.limit, page.total);
    Ok(())
}

pub fn print_child_chunks(value: &Value) -> Result<()> {
    let page: Page<ChildChunk> = parse(value)?;
    if page.data.is_empty() {
        println!("No child chunks found.");
        return Ok(());
    }
    for chunk in &page.data {
        println!(
            "{}  words={}  {}",
            chunk.id,
            chunk.word_count.unwrap_or(0),
            truncate(&chunk.content, 120)
        );
    }
    Ok(())
}

pub fn print_retrieval(value: &Value) -> Result<()> {
    let result: RetrievalResult = parse(value)?;
    if result.records.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, record) in result.records.iter().enumerate() {
        let doc_name = record
            .segment
            .document
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("(unknown document)");
        let score = record
            .score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "-".to_string());
        println!("{}. [{}] {}", i + 1, score, doc_name);
        println!("    segment: {}", record.segment.id);
        println!("    {}", truncate(&record.segment.content, 300));
        println!();
    }
    Ok(())
}

pub fn print_metadata(value: &Value) -> Result<()> {
    let list: MetadataList = parse(value)?;
    println!("built-in fields: {}", if list.built_in_field_enabled { "enabled" } else { "disabled" });
    if list.doc_metadata.is_empty() {
        println!("No metadata fields.");
        return Ok(());
    }
    println!("{:<36}  {:<24} {:<8} USES", "ID", "NAME", "TYPE");
    for field in &list.doc_metadata {
        println!(
            "{:<36}  {:<24} {:<8} {}",
            field.id,
            truncate(&field.name, 24),
            field.field_type,
            field.use_count
        );
    }
    Ok(())
}

fn print_page_footer(page: u32, limit: u32, total: u64) {
    let pages = if limit == 0 {
        1
    } else {
        total.div_ceil(u64::from(limit)).max(1)
    };
    println!();
    println!("Page {} of {} | Total: {}", page.max(1), pages, total);
}

/// Shorten to at most `max` characters, on a char boundary, single line.
fn truncate(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
