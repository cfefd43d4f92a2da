//! Vehicle repositories
//!
//! One storage-agnostic contract, two backends. Both front ends hold an
//! `Arc<dyn VehicleRepository>` built once at startup by [`open_repository`]
//! and never look at which engine is behind it.
//!
//! Every backend follows the same path for each operation: validation runs
//! first and rejects before anything is written; only then is the change
//! applied to storage. Error kinds are identical across backends.

pub mod file_repository;
pub mod pg_repository;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{BackendKind, StorageConfig};
use crate::models::{Vehicle, VehiclePatch, VehicleStatus};
use crate::utils::errors::{RepoError, RepoResult};

pub use file_repository::FileVehicleRepository;
pub use pg_repository::PgVehicleRepository;

/// CRUD and query contract shared by every storage backend
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Store a new vehicle. Fails with `DuplicateId` if the id is taken.
    async fn add(&self, vehicle: Vehicle) -> RepoResult<()>;

    async fn get(&self, id: &str) -> RepoResult<Vehicle>;

    /// All vehicles in insertion order, optionally only those with `status`.
    async fn list(&self, status: Option<VehicleStatus>) -> RepoResult<Vec<Vehicle>>;

    /// Merge `patch` onto the stored record, re-validate, persist, and
    /// return the stored result. An empty patch returns the record as is.
    async fn update(&self, id: &str, patch: VehiclePatch) -> RepoResult<Vehicle>;

    async fn remove(&self, id: &str) -> RepoResult<()>;

    fn backend(&self) -> BackendKind;
}

/// Build the repository selected by `config`
pub async fn open_repository(config: &StorageConfig) -> RepoResult<Arc<dyn VehicleRepository>> {
    match config.backend {
        BackendKind::File => {
            info!(path = %config.data_path.display(), "Using JSON file backend");
            Ok(Arc::new(FileVehicleRepository::new(&config.data_path)))
        }
        BackendKind::Relational => {
            let database = config.database.as_ref().ok_or_else(|| {
                RepoError::StorageUnavailable("no database configured".to_string())
            })?;
            info!(url = %database.masked_url(), "Using relational backend");
            let pool = database.create_pool().await?;
            let repository = PgVehicleRepository::new(pool);
            repository.ensure_schema().await?;
            Ok(Arc::new(repository))
        }
    }
}
