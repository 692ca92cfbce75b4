//! Native-tool execution for migration adapters.
//!
//! Database client tools receive their connection parameters through an
//! explicit [`EnvironmentMap`] merged over the ambient process environment;
//! credentials never appear on a command line. Standard error is captured in
//! full (not streamed) and routed through a caller-supplied handler, so an
//! adapter can treat selected tool failures as tolerable partial results.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{Result, error::MigrateError};

/// Environment passed to a spawned native tool.
///
/// Keys are the engine's canonical connection variable names (for Postgres:
/// `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`). A parameter the configuration
/// leaves unset has no entry at all; some tools treat an empty value
/// differently from an absent one.
pub type EnvironmentMap = HashMap<&'static str, String>;

/// Runs a native tool to completion.
///
/// The command is spawned with `environment` merged over the ambient process
/// environment and with stdin closed. Both output streams are captured; the
/// call blocks (asynchronously) until the child exits, with no timeout.
///
/// Every failure path funnels into `on_error` with the raw failure text:
/// a non-zero exit passes the captured stderr, and an OS-level launch failure
/// (missing executable, permission denied) passes the OS error with the
/// program name appended as the trailing token. The handler decides whether
/// the text is fatal (`Err`) or tolerable (`Ok(())`).
///
/// On a zero exit, captured stdout is appended to `append_stdout_to` when one
/// is given. A tolerated failure appends nothing.
///
/// # Errors
/// Returns whatever `on_error` raises, or an I/O error if the append target
/// cannot be written.
pub async fn execute<F>(
    program: &str,
    args: &[OsString],
    environment: &EnvironmentMap,
    append_stdout_to: Option<&Path>,
    on_error: F,
) -> Result<()>
where
    F: FnOnce(String) -> Result<()>,
{
    let mut command = Command::new(program);
    command.args(args).envs(environment).stdin(Stdio::null());

    let output = match command.output().await {
        Ok(output) => output,
        // The OS error alone does not name the tool; append it so the
        // trailing token of the classified text is the executable.
        Err(err) => return on_error(format!("{err} - {program}")),
    };

    if !output.status.success() {
        return on_error(String::from_utf8_lossy(&output.stderr).into_owned());
    }

    if let Some(path) = append_stdout_to {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await
            .map_err(|e| {
                MigrateError::io(format!("failed to open {} for append", path.display()), e)
            })?;
        file.write_all(&output.stdout).await.map_err(|e| {
            MigrateError::io(format!("failed to append to {}", path.display()), e)
        })?;
    }

    Ok(())
}
