//! Services Layer
//!
//! Business logic that spans more than one repository or an external source.

pub mod lookup_service;

// Re-export for convenience
pub use lookup_service::{BookSearchResult, search_by_isbn};
