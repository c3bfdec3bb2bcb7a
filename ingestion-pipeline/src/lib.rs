pub mod chunking;
pub mod pipeline;
pub mod url_text_retrieval;

pub use pipeline::{ingest_urls, DefaultIngestionServices, IngestionReport, IngestionServices};
