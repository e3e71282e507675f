//! Catalog application services: admin ingestion and the public read side.

mod browse_cache;
mod ingest;
mod query;

pub use browse_cache::BrowseCache;
pub use ingest::{IngestOptions, IngestService};
pub use query::{BrowseResponse, CatalogQueryService, GenreRail};
