//! Storage collaborators
//!
//! The engine never touches a filesystem directly: documents and food files
//! come through the narrow traits here. `FsVault` is the bundled
//! implementation over a directory of markdown files.

pub mod block;
pub mod cache;
pub mod fs;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::FoodFile;

pub use block::{find_block, find_blocks, BlockSpan};
pub use cache::VaultCache;
pub use fs::FsVault;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document not found: {0}")]
    DocumentNotFound(String),
}

/// A document handle; the path is relative to the vault root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    pub path: String,
}

impl Document {
    pub fn new<P: Into<String>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// A change reported by the storage layer; paths are vault-relative
#[derive(Debug, Clone)]
pub enum StorageEvent {
    Created(String),
    Modified(String),
    Deleted(String),
    Renamed { from: String, to: String },
}

/// Document store collaborator.
///
/// Reads and writes are whole-document and assumed atomic at that
/// granularity; a failure affects the single operation only.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Enumerate documents; the order is the block-shadowing order
    async fn list_documents(&self) -> Result<Vec<Document>, StorageError>;

    async fn read(&self, doc: &Document) -> Result<String, StorageError>;

    async fn write(&self, doc: &Document, text: &str) -> Result<(), StorageError>;
}

/// Food-file collaborator: the per-food nutrition records.
///
/// The engine only reads these; creation and editing happen elsewhere.
#[async_trait]
pub trait FoodFileSource: Send + Sync {
    async fn food_files(&self) -> Result<Vec<FoodFile>, StorageError>;
}
