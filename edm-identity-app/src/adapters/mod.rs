//! Storage adapters for catalog snapshots.

mod json_file_store;

pub use json_file_store::JsonFileCatalogStore;
