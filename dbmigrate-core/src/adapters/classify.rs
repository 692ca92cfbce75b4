//! Shared classification of raw failure text.
//!
//! Each engine adapter carries an ordered table of substring rules; the
//! dispatch here is engine-agnostic. Driver errors and captured subprocess
//! stderr take the same path, so the orchestrator sees one failure shape
//! regardless of origin. Rules are evaluated top to bottom and the first
//! match wins; text matching no rule passes through as `Unclassified`.

use crate::error::MigrateError;

/// Lifecycle operation providing classification context.
///
/// Some rules only apply in certain contexts: "does not exist" during a drop
/// means the target database is missing, while the same words in a create
/// failure usually describe a role or tablespace and must pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `CREATE DATABASE` over the driver.
    Create,
    /// `DROP DATABASE` over the driver.
    Drop,
    /// Structural and migrations-data dump via the native tool.
    Dump,
    /// Schema load over the driver.
    Load,
}

/// How a matched rule turns into a structured failure.
pub(crate) enum RuleKind {
    /// A fixed advisory replaces the raw tool output.
    AlreadyExists {
        /// The advisory text.
        advisory: &'static str,
    },
    /// Message names the configured database, never one parsed from the text.
    NotFound,
    /// The trailing token of the raw text is the executable that failed to
    /// launch.
    MissingExecutable,
}

/// One ordered classification rule.
pub(crate) struct PatternRule {
    /// Case-insensitive substrings; any hit matches the rule.
    pub needles: &'static [&'static str],
    /// Operations the rule applies to; `None` means every context.
    pub operations: Option<&'static [Operation]>,
    /// Failure the match produces.
    pub kind: RuleKind,
}

/// Maps raw failure text to a structured failure using an engine's rule
/// table. First match wins; unmatched text is passed through.
pub(crate) fn classify(
    rules: &[PatternRule],
    raw: &str,
    operation: Operation,
    database: &str,
) -> MigrateError {
    let lowered = raw.to_lowercase();

    for rule in rules {
        if let Some(operations) = rule.operations {
            if !operations.contains(&operation) {
                continue;
            }
        }
        if !rule.needles.iter().any(|needle| lowered.contains(needle)) {
            continue;
        }

        return match &rule.kind {
            RuleKind::AlreadyExists { advisory } => MigrateError::DatabaseAlreadyExists {
                message: (*advisory).to_string(),
            },
            RuleKind::NotFound => MigrateError::DatabaseNotFound {
                database: database.to_string(),
            },
            RuleKind::MissingExecutable => MigrateError::ExecutableNotFound {
                executable: raw
                    .split_whitespace()
                    .last()
                    .unwrap_or_default()
                    .to_string(),
            },
        };
    }

    MigrateError::Unclassified {
        message: raw.trim_end().to_string(),
    }
}
