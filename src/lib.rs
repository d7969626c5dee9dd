//! # dify-kb
//!
//! A typed client for a remote knowledge-base (RAG) management API, plus the
//! `dify-kb` command-line tool built on top of it.
//!
//! The library shapes requests and classifies responses. It holds no state
//! of its own: the remote service is the system of record.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────┐   ┌──────────┐   ┌────────────┐
//! │  Caller  │──▶│ Managers (KB / Doc / │──▶│ Payload  │   │  Remote    │
//! │ CLI/test │   │ Segment / Retrieval) │   │ builders │   │  HTTP API  │
//! └──────────┘   └──────────┬───────────┘   └──────────┘   └─────▲──────┘
//!                           │                                    │
//!                           └──────────▶ Transport ──────────────┘
//!                                  (bearer auth, classification)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export DIFY_API_KEY=dataset-...
//! export DIFY_BASE_URL=https://api.dify.ai/v1
//! dify-kb kb list
//! dify-kb --dataset <id> doc create-text --name Notes --text "hello world"
//! dify-kb --dataset <id> retrieve "what is rust?" --search-method hybrid_search
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | [`Client`] facade owning one transport |
//! | [`config`] | Credentials and TOML configuration |
//! | [`error`] | Error taxonomy |
//! | [`transport`] | Authenticated HTTP and response classification |
//! | [`payload`] | Request specs, wire payloads, and builders |
//! | [`knowledge_base`] | Dataset operations |
//! | [`document`] | Document ingestion and lifecycle |
//! | [`segment`] | Segments and child chunks |
//! | [`retrieval`] | Retrieval queries and metadata |
//! | [`models`] | Typed views over response bodies |

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod knowledge_base;
pub mod models;
pub mod payload;
pub mod retrieval;
pub mod segment;
pub mod transport;

pub use client::Client;
pub use config::Credentials;
pub use error::{ApiError, Error, Result};
