//! Environment configuration
//!
//! Resolves the storage backend and the HTTP bind address from environment
//! variables. Values are read through a lookup function so the resolution
//! can be exercised without touching the process environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use super::database::DatabaseConfig;

pub const DEFAULT_DATA_PATH: &str = "data/vehicles.json";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be set for the {backend} backend")]
    Missing { key: &'static str, backend: BackendKind },

    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Storage engine selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    #[default]
    File,
    Relational,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::Relational => "relational",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(BackendKind::File),
            "relational" | "postgres" | "sql" => Ok(BackendKind::Relational),
            other => Err(format!("unknown backend '{}', expected file or relational", other)),
        }
    }
}

/// Everything a repository constructor needs
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: BackendKind,
    pub data_path: PathBuf,
    pub database: Option<DatabaseConfig>,
}

impl StorageConfig {
    pub fn file(data_path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::File,
            data_path: data_path.into(),
            database: None,
        }
    }

    pub fn relational(database: DatabaseConfig) -> Self {
        Self {
            backend: BackendKind::Relational,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            database: Some(database),
        }
    }

    /// Build from explicit settings, as the CLI does after argument parsing
    pub fn resolve(
        backend: BackendKind,
        data_path: Option<PathBuf>,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        match backend {
            BackendKind::File => Ok(Self::file(
                data_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            )),
            BackendKind::Relational => {
                let url = database_url.filter(|u| !u.trim().is_empty()).ok_or(
                    ConfigError::Missing {
                        key: "DATABASE_URL",
                        backend,
                    },
                )?;
                Ok(Self::relational(DatabaseConfig::new(url)))
            }
        }
    }
}

/// HTTP bind address and allowed CORS origins (empty allows any)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Environment configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `FLEET_BACKEND`, `FLEET_DATA_PATH`, `DATABASE_URL`,
    /// `FLEET_DB_MAX_CONNECTIONS`, `HOST`, `PORT` and `CORS_ORIGINS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("FLEET_BACKEND") {
            Some(value) => {
                let parsed = value.parse::<BackendKind>();
                parsed.map_err(|reason| ConfigError::Invalid {
                    key: "FLEET_BACKEND",
                    value,
                    reason,
                })?
            }
            None => BackendKind::default(),
        };

        let mut storage = StorageConfig::resolve(
            backend,
            lookup("FLEET_DATA_PATH").map(PathBuf::from),
            lookup("DATABASE_URL"),
        )?;

        if let (Some(database), Some(value)) =
            (storage.database.as_mut(), lookup("FLEET_DB_MAX_CONNECTIONS"))
        {
            database.max_connections = parse_var("FLEET_DB_MAX_CONNECTIONS", value)?;
        }

        let server = ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: match lookup("PORT") {
                Some(value) => parse_var("PORT", value)?,
                None => DEFAULT_PORT,
            },
            cors_origins: lookup("CORS_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(Self { storage, server })
    }
}

fn parse_var<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
