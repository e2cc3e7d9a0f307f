//! Storage and collaborator abstractions

mod catalog_store;
mod verification_checker;

pub use catalog_store::{CatalogStore, InMemoryCatalogStore};
pub use verification_checker::VerificationChecker;
