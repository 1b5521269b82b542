// src/core/mod.rs
//! Storage and outbound service plumbing shared by both programs

pub mod completion_client;
pub mod database;
pub mod migrations;

pub use completion_client::{CompletionClient, CompletionError};
pub use database::{JobStore, SaveOutcome};
pub use migrations::AppliedMigration;
