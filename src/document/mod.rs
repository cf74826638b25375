//! Processed-document model and local document tables.

pub mod error;
pub mod model;
pub mod store;


pub use error::{DocumentError, DocumentResult};
pub use model::{DocumentAnalysis, ProcessedDocument, ProcessingStatus};
pub use store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
