//! Persistence seam for RSVP rows.
//!
//! The relay only ever creates rows; it never reads, updates or deletes
//! them. `NotionStore` talks to the hosted page database, `MemoryStore`
//! keeps rows in process for tests and local runs.

use async_trait::async_trait;
use shared::domain::{RecordId, RsvpRecord};
use thiserror::Error;

mod memory;
mod notion;

pub use memory::MemoryStore;
pub use notion::{NotionConfig, NotionStore, DEFAULT_NOTION_API_URL, DEFAULT_NOTION_VERSION};

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("record store is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("invalid record store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("record store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("record store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("record store returned an unexpected response: {0}")]
    InvalidResponse(String),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RecordStoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_record(&self, record: &RsvpRecord) -> Result<RecordId>;

    /// Cheap probe used by the health endpoint.
    async fn check_access(&self) -> Result<()>;
}
