//! Connection assembly for the PostgreSQL adapter.
//!
//! Credentials reach spawned tooling exclusively through the canonical
//! libpq environment variables and reach the driver through its connect
//! options; they are never placed on a command line.

use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};

use super::{ADMIN_DATABASE, PostgresAdapter};
use crate::process::EnvironmentMap;

/// Canonical libpq connection variables.
const HOST: &str = "PGHOST";
const PORT: &str = "PGPORT";
const USER: &str = "PGUSER";
const PASSWORD: &str = "PGPASSWORD";

impl PostgresAdapter {
    /// Builds the environment for spawned native tools.
    ///
    /// Only present fields produce an entry. A field left unset is absent
    /// from the map entirely, so the tool's own defaulting (local socket,
    /// default port, OS user) applies; pg_dump treats an empty value
    /// differently from an unset one.
    pub fn environment_variables(&self) -> EnvironmentMap {
        let mut env = EnvironmentMap::new();
        if let Some(host) = &self.config.host {
            env.insert(HOST, host.clone());
        }
        if let Some(port) = self.config.port {
            env.insert(PORT, port.to_string());
        }
        if let Some(username) = &self.config.username {
            env.insert(USER, username.clone());
        }
        if let Some(password) = &self.config.password {
            env.insert(PASSWORD, password.clone());
        }
        env
    }

    /// Opens a short-lived connection for one operation.
    ///
    /// `privileged` targets the administrative database instead of the
    /// configured one; create and drop cannot run inside the database they
    /// operate on. The raw driver error is returned for the caller to
    /// classify under its operation context.
    pub(crate) async fn connect(
        &self,
        privileged: bool,
    ) -> std::result::Result<PgConnection, sqlx::Error> {
        let mut options = PgConnectOptions::new();
        if let Some(host) = &self.config.host {
            options = options.host(host);
        }
        if let Some(port) = self.config.port {
            options = options.port(port);
        }
        if let Some(username) = &self.config.username {
            options = options.username(username);
        }
        if let Some(password) = &self.config.password {
            options = options.password(password);
        }

        let database = if privileged {
            ADMIN_DATABASE
        } else {
            &self.config.database
        };

        PgConnection::connect_with(&options.database(database)).await
    }
}
