//! Client facade.
//!
//! [`Client`] owns a single [`Transport`] and hands out the four managers,
//! all sharing it:
//!
//! ```rust,no_run
//! # async fn example() -> dify_kb::Result<()> {
//! use dify_kb::payload::ListDatasetsQuery;
//! use dify_kb::Client;
//!
//! let client = Client::from_env()?;
//! let datasets = client.knowledge_bases().list(&ListDatasetsQuery::default()).await?;
//! println!("{}", datasets["total"]);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::Credentials;
use crate::document::DocumentManager;
use crate::error::{Error, Result};
use crate::knowledge_base::KnowledgeBaseManager;
use crate::retrieval::RetrievalManager;
use crate::segment::SegmentManager;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<Transport>,
    knowledge_bases: KnowledgeBaseManager,
    documents: DocumentManager,
    segments: SegmentManager,
    retrieval: RetrievalManager,
}

impl Client {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self::with_transport(Transport::new(credentials)?))
    }

    /// Build a client from `DIFY_API_KEY` and `DIFY_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    pub fn with_timeout(credentials: Credentials, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self::with_transport(Transport::with_timeout(
            credentials,
            timeout,
        )?))
    }

    pub fn with_transport(transport: Transport) -> Self {
        let transport = Arc::new(transport);
        Self {
            knowledge_bases: KnowledgeBaseManager::new(Arc::clone(&transport)),
            documents: DocumentManager::new(Arc::clone(&transport)),
            segments: SegmentManager::new(Arc::clone(&transport)),
            retrieval: RetrievalManager::new(Arc::clone(&transport)),
            transport,
        }
    }

    pub fn knowledge_bases(&self) -> &KnowledgeBaseManager {
        &self.knowledge_bases
    }

    pub fn documents(&self) -> &DocumentManager {
        &self.documents
    }

    pub fn segments(&self) -> &SegmentManager {
        &self.segments
    }

    pub fn retrieval(&self) -> &RetrievalManager {
        &self.retrieval
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

/// Validate a path identifier before it is formatted into a URL.
///
/// Only RFC 3986 unreserved characters (`A-Z a-z 0-9 - . _ ~`) are accepted,
/// and `.`/`..` are rejected, so an identifier always stays one path segment.
pub(crate) fn require_id<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", field)));
    }
    if let Some(c) = trimmed.chars().find(|c| !is_unreserved(*c)) {
        return Err(Error::InvalidArgument(format!(
            "{} contains invalid character {:?}: {}",
            field, c, trimmed
        )));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(Error::InvalidArgument(format!(
            "{} must not be a dot segment: {}",
            field, trimmed
        )));
    }
    Ok(trimmed)
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}
