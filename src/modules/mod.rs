//! External integrations
pub mod integrations;
