//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no Axum).
//! Trait definitions, the collection state planner and domain error types.

pub mod collection;
pub mod errors;
pub mod metadata;
pub mod repositories;

pub use collection::*;
pub use errors::DomainError;
pub use metadata::{BookMetadata, MetadataResolver};
pub use repositories::*;
