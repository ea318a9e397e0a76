//! HTTP server configuration object and helpers.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use actix_web::cookie::{Key, SameSite};
use cookbook::domain::Email;
use cookbook::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Process settings loaded via OrthoConfig from `COOKBOOK_*` variables,
/// configuration files and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COOKBOOK")]
pub struct AppConfig {
    /// Interface to listen on.
    pub host: Option<String>,
    /// TCP port to listen on.
    pub port: Option<u16>,
    /// PostgreSQL connection string. In-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Accounts registered with this e-mail become platform admins.
    pub bootstrap_admin_email: Option<String>,
}

/// Errors raised while interpreting [`AppConfig`] values.
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error("COOKBOOK_HOST is not an IP address: {0}")]
    InvalidHost(String),
    #[error("COOKBOOK_BOOTSTRAP_ADMIN_EMAIL is not a valid e-mail: {0}")]
    InvalidBootstrapEmail(String),
}

impl AppConfig {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppConfigError> {
        let host = match self.host.as_deref() {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| AppConfigError::InvalidHost(raw.to_owned()))?,
            None => DEFAULT_HOST,
        };
        Ok(SocketAddr::new(host, self.port.unwrap_or(DEFAULT_PORT)))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Normalised bootstrap admin e-mail, if one is configured.
    pub fn bootstrap_admin(&self) -> Result<Option<Email>, AppConfigError> {
        self.bootstrap_admin_email
            .as_deref()
            .map(|raw| {
                Email::new(raw).map_err(|_| AppConfigError::InvalidBootstrapEmail(raw.to_owned()))
            })
            .transpose()
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) bootstrap_admin: Option<Email>,
}

impl ServerConfig {
    /// Construct a server configuration from session settings and a bind address.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            bootstrap_admin: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the server stores users, groups and recipes in
    /// PostgreSQL; otherwise it keeps them in process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Promote accounts registered with `email` to platform admin.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, email: Option<Email>) -> Self {
        self.bootstrap_admin = email;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for application configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "COOKBOOK_HOST",
        "COOKBOOK_PORT",
        "COOKBOOK_DATABASE_URL",
        "COOKBOOK_DB_MAX_CONNECTIONS",
        "COOKBOOK_BOOTSTRAP_ADMIN_EMAIL",
    ];

    fn load_from_empty_args() -> AppConfig {
        AppConfig::load_from_iter([OsString::from("cookbook")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let config = load_from_empty_args();
        assert_eq!(
            config.bind_addr().expect("default address"),
            SocketAddr::new(DEFAULT_HOST, DEFAULT_PORT)
        );
        assert!(config.database_url.is_none());
        assert_eq!(config.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
        assert!(config.bootstrap_admin().expect("no admin").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("COOKBOOK_HOST", "127.0.0.1"),
            ("COOKBOOK_PORT", "9090"),
            ("COOKBOOK_DATABASE_URL", "postgres://localhost/cookbook"),
            ("COOKBOOK_DB_MAX_CONNECTIONS", "4"),
            ("COOKBOOK_BOOTSTRAP_ADMIN_EMAIL", "Chef@Example.com"),
        ]));

        let config = load_from_empty_args();
        assert_eq!(
            config.bind_addr().expect("address"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/cookbook")
        );
        assert_eq!(config.db_max_connections(), 4);
        let admin = config.bootstrap_admin().expect("valid").expect("present");
        assert_eq!(admin.as_ref(), "chef@example.com");
    }

    #[rstest]
    #[case("COOKBOOK_HOST", "localhost")]
    #[case("COOKBOOK_BOOTSTRAP_ADMIN_EMAIL", "not-an-email")]
    fn malformed_values_are_reported(#[case] name: &str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(name, value)]));

        let config = load_from_empty_args();
        let failed = config.bind_addr().is_err() || config.bootstrap_admin().is_err();
        assert!(failed, "{name}={value} should be rejected");
    }
}
