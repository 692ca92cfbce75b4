//! Core types and lifecycle operations for dbmigrate.
//!
//! This crate implements database lifecycle operations (create, drop,
//! structural dump, structural load) for a migration orchestrator by
//! delegating to each engine's native command-line tooling and wire-protocol
//! driver, behind one engine-agnostic contract.
//!
//! # Architecture
//! - Object-safe [`adapters::MigrationAdapter`] trait with one adapter per
//!   engine, instantiated through [`adapters::create_adapter`]
//! - Free-text failures from tools and the driver normalized into the
//!   [`error::MigrateError`] taxonomy by per-engine rule tables
//! - Native tools run through [`process::execute`] with credentials supplied
//!   as environment variables, never as command-line arguments
//!
//! # Security Guarantees
//! - Passwords never appear on command lines, in logs, or in error messages
//! - Connection URLs are redacted before display
//! - A parameter left unset stays unset; the engine's own defaulting applies

pub mod adapters;
pub mod error;
pub mod logging;
pub mod process;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, DatabaseType, MigrationAdapter, create_adapter, detect_database_type,
};
pub use error::{MigrateError, Result, redact_database_url};
pub use logging::init_logging;
pub use process::EnvironmentMap;
