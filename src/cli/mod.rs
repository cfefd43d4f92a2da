//! Command-line front end
//!
//! Argument parsing lives here; `commands` runs one repository operation
//! per invocation and turns the outcome into an exit code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{BackendKind, ConfigError, StorageConfig};

pub mod commands;

pub use commands::run;

#[derive(Debug, Parser)]
#[command(name = "fleet", version, about = "Manage the vehicle registry")]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Storage backend
    #[arg(long, value_enum, env = "FLEET_BACKEND", default_value_t = BackendKind::File, global = true)]
    pub backend: BackendKind,

    /// JSON document used by the file backend
    #[arg(long = "db", env = "FLEET_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Connection string for the relational backend
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,
}

impl StorageArgs {
    pub fn to_config(&self) -> Result<StorageConfig, ConfigError> {
        StorageConfig::resolve(
            self.backend,
            self.data_path.clone(),
            self.database_url.clone(),
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new vehicle
    Add {
        id: String,
        plate: String,
        model: String,
        #[arg(allow_hyphen_values = true)]
        year: String,
        #[arg(allow_hyphen_values = true)]
        mileage: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List vehicles, optionally by status
    List {
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one vehicle
    Show { id: String },

    /// Change some fields of a vehicle
    Update {
        id: String,
        #[arg(long)]
        plate: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        year: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        mileage: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a vehicle
    Remove { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_mileage_reaches_validation() {
        let cli = Cli::try_parse_from(["fleet", "add", "V1", "AB1", "Panda", "2020", "-1"]).unwrap();
        match cli.command {
            Command::Add { mileage, .. } => assert_eq!(mileage, "-1"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["fleet", "list", "--db", "/tmp/x.json"]).unwrap();
        assert_eq!(cli.storage.data_path, Some(PathBuf::from("/tmp/x.json")));
    }

    #[test]
    fn test_relational_without_url_is_rejected() {
        let args = StorageArgs {
            backend: BackendKind::Relational,
            data_path: None,
            database_url: None,
        };
        assert!(matches!(args.to_config(), Err(ConfigError::Missing { .. })));
    }
}
