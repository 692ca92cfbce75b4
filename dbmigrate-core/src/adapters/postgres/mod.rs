//! PostgreSQL migration adapter.
//!
//! Lifecycle DDL (create/drop) runs over the wire-protocol driver so the
//! database name never crosses a shell boundary; structure dump runs through
//! `pg_dump` with credentials supplied via the canonical `PG*` environment
//! variables, and load executes the dumped file over the driver as one batch.
//!
//! # Module Structure
//! - `connection`: environment map assembly and short-lived driver connections

mod connection;

#[cfg(test)]
mod tests;

use std::ffi::OsString;

use async_trait::async_trait;
use sqlx::{Connection, Executor};
use tracing::debug;

use super::classify::{Operation, PatternRule, RuleKind, classify};
use super::{ConnectionConfig, DatabaseType, MigrationAdapter};
use crate::error::MigrateError;
use crate::{Result, process};

/// Native dump tool invoked for both dump sub-steps.
const PG_DUMP: &str = "pg_dump";

/// Administrative database targeted by privileged connections; a database
/// cannot create or drop itself from within.
const ADMIN_DATABASE: &str = "postgres";

/// `pg_dump` wording for "the selected table was not found", tolerated during
/// the migrations-data step. Matched case-insensitively but English-only: a
/// differently-localized pg_dump surfaces as `Unclassified` instead.
const NO_MATCHING_TABLES: &str = "no matching tables";

/// Advisory returned when creation fails on an existing database.
pub const CREATE_FAILED_ADVISORY: &str = "Database creation failed. If the database already \
     exists, another session may be holding it open; disconnect any open consoles and retry. \
     See docs/troubleshooting.md for recovery steps.";

/// Ordered classification rules for raw Postgres driver and tool output.
static RULES: &[PatternRule] = &[
    PatternRule {
        needles: &["database exists", "already exists"],
        operations: None,
        kind: RuleKind::AlreadyExists {
            advisory: CREATE_FAILED_ADVISORY,
        },
    },
    PatternRule {
        needles: &["doesn't exist", "does not exist"],
        operations: Some(&[Operation::Drop, Operation::Load, Operation::Dump]),
        kind: RuleKind::NotFound,
    },
    PatternRule {
        needles: &["no such file or directory"],
        operations: None,
        kind: RuleKind::MissingExecutable,
    },
];

/// PostgreSQL adapter: four lifecycle operations over one immutable
/// configuration. Driver connections are opened per operation and dropped
/// after it; nothing is pooled or retried.
#[derive(Debug)]
pub struct PostgresAdapter {
    config: ConnectionConfig,
}

impl PostgresAdapter {
    /// Creates a new PostgreSQL adapter over a validated configuration.
    ///
    /// # Errors
    /// Returns a configuration error if the configuration is invalid.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn classify(&self, raw: &str, operation: Operation) -> MigrateError {
        classify(RULES, raw, operation, &self.config.database)
    }

    /// Opens a connection, runs one SQL batch, and closes the connection.
    /// Any driver failure is classified under `operation`'s context.
    async fn run_sql(&self, privileged: bool, sql: &str, operation: Operation) -> Result<()> {
        let mut conn = self
            .connect(privileged)
            .await
            .map_err(|e| self.classify(&e.to_string(), operation))?;

        let result = conn.execute(sqlx::raw_sql(sql)).await;
        conn.close().await.ok();

        result
            .map(|_| ())
            .map_err(|e| self.classify(&e.to_string(), operation))
    }

    /// Structure-only dump, excluding the migrations bookkeeping table.
    /// Fatal on any failure; the data step must not run after it.
    async fn dump_structure(&self) -> Result<()> {
        let args: Vec<OsString> = vec![
            "-s".into(),
            "-x".into(),
            "-O".into(),
            "-T".into(),
            self.config.migrations_table.clone().into(),
            "-f".into(),
            self.config.schema_path.clone().into_os_string(),
            self.config.database.clone().into(),
        ];

        process::execute(
            PG_DUMP,
            &args,
            &self.environment_variables(),
            None,
            |raw| Err(self.classify(&raw, Operation::Dump)),
        )
        .await
    }

    /// Dumps the migrations bookkeeping rows, appending them to the schema
    /// file. A table that does not exist yet is not an error.
    async fn dump_migrations_data(&self) -> Result<()> {
        let args: Vec<OsString> = vec![
            "-t".into(),
            self.config.migrations_table.clone().into(),
            self.config.database.clone().into(),
        ];

        process::execute(
            PG_DUMP,
            &args,
            &self.environment_variables(),
            Some(self.config.schema_path.as_path()),
            |raw| {
                if raw.to_lowercase().contains(NO_MATCHING_TABLES) {
                    debug!(
                        table = %self.config.migrations_table,
                        "migrations table has nothing to dump; nothing appended"
                    );
                    Ok(())
                } else {
                    Err(self.classify(&raw, Operation::Dump))
                }
            },
        )
        .await
    }
}

/// Wraps a database name in double quotes unless the caller pre-quoted it.
fn quote_identifier(name: &str) -> String {
    if name.starts_with('"') || name.starts_with('\'') {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

#[async_trait]
impl MigrationAdapter for PostgresAdapter {
    async fn create_database(&self) -> Result<()> {
        debug!(database = %self.config.database, "creating database");
        let sql = format!(
            "CREATE DATABASE {}",
            quote_identifier(&self.config.database)
        );
        self.run_sql(true, &sql, Operation::Create).await
    }

    async fn drop_database(&self) -> Result<()> {
        debug!(database = %self.config.database, "dropping database");
        let sql = format!("DROP DATABASE {}", quote_identifier(&self.config.database));
        self.run_sql(true, &sql, Operation::Drop).await
    }

    async fn dump_schema(&self) -> Result<()> {
        debug!(
            database = %self.config.database,
            schema_path = %self.config.schema_path.display(),
            "dumping database structure"
        );
        self.dump_structure().await?;
        self.dump_migrations_data().await
    }

    async fn load_schema(&self) -> Result<()> {
        // A fresh database with no prior dump is valid; nothing to load and
        // no connection is opened.
        if !self.config.schema_path.exists() {
            debug!(
                schema_path = %self.config.schema_path.display(),
                "no schema file; nothing to load"
            );
            return Ok(());
        }

        // read_to_string bounds the open/read/close of the handle; the file
        // is released before any statement executes.
        let sql = tokio::fs::read_to_string(&self.config.schema_path)
            .await
            .map_err(|e| {
                MigrateError::io(
                    format!("failed to read {}", self.config.schema_path.display()),
                    e,
                )
            })?;

        debug!(database = %self.config.database, "loading database structure");
        self.run_sql(false, &sql, Operation::Load).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
    }

    fn connection_config(&self) -> &ConnectionConfig {
        &self.config
    }
}
