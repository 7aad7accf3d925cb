// Catalog Store: CSV ingestion, column mapping, and the read-only in-memory store.

pub mod loader;
pub mod mapping;
pub mod store;

pub use loader::load_catalog;
pub use store::{CatalogStore, IndexDocument};
