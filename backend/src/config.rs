//! Startup configuration read from the environment.
//!
//! Every `DB_*` variable is optional except `DB_PASSWORD`, which must be set
//! whenever the database lives on a non-local host. A `.env` file is loaded by
//! `main` before [`Config::from_env`] runs.

use std::fmt;
use std::net::SocketAddr;

/// Fixed listen address: all interfaces, port 5000.
pub const LISTEN_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 5000);

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_NAME: &str = "inkdrop_db";
const DEFAULT_DB_USER: &str = "inkdrop";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Seconds libpq waits for a new connection before giving up.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DB_PASSWORD must be set when DB_HOST is not local (DB_HOST={host})")]
    MissingPassword { host: String },

    #[error("{var} must be a valid number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("DB_POOL_SIZE must be greater than zero")]
    EmptyPool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database: DatabaseConfig,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let host = var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.into());
        let port = match var("DB_PORT") {
            Some(value) => parse_number("DB_PORT", value)?,
            None => DEFAULT_DB_PORT,
        };
        let pool_size = match var("DB_POOL_SIZE") {
            Some(value) => parse_number("DB_POOL_SIZE", value)?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }

        let password = match var("DB_PASSWORD") {
            Some(password) => password,
            None if is_local_host(&host) => String::new(),
            None => return Err(ConfigError::MissingPassword { host }),
        };

        Ok(Self {
            listen_addr: SocketAddr::from(LISTEN_ADDR),
            database: DatabaseConfig {
                host,
                port,
                name: var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.into()),
                user: var("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.into()),
                password,
                pool_size,
            },
        })
    }
}

impl DatabaseConfig {
    /// libpq keyword/value connection string, including the connect timeout.
    pub fn connection_string(&self) -> String {
        let mut conninfo = format!(
            "host={} port={} dbname={} user={} connect_timeout={}",
            quote(&self.host),
            self.port,
            quote(&self.name),
            quote(&self.user),
            CONNECT_TIMEOUT_SECS,
        );
        if !self.password.is_empty() {
            conninfo.push_str(" password=");
            conninfo.push_str(&quote(&self.password));
        }
        conninfo
    }
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}

/// Quote a conninfo value: wrap in single quotes, escaping `\` and `'`.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
