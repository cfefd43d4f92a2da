use std::sync::Arc;
use tracing::debug;

use crate::models::{Vehicle, VehicleDraft, VehiclePatch, VehicleStatus};
use crate::repositories::VehicleRepository;
use crate::utils::errors::{AppError, AppResult, RepoError};

/// Front-end entry point over the repository contract.
///
/// The CLI and the web handlers both go through here, so every front end
/// turns raw text into the same calls. No validation happens in this layer
/// beyond what the model does.
pub struct VehicleController {
    repository: Arc<dyn VehicleRepository>,
}

impl VehicleController {
    pub fn new(repository: Arc<dyn VehicleRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, draft: VehicleDraft) -> AppResult<Vehicle> {
        let vehicle = draft.validate().map_err(RepoError::from)?;
        self.repository.add(vehicle.clone()).await?;
        Ok(vehicle)
    }

    pub async fn get(&self, id: &str) -> AppResult<Vehicle> {
        Ok(self.repository.get(id).await?)
    }

    /// `status` is the raw filter text; blank means no filter.
    pub async fn list(&self, status: Option<&str>) -> AppResult<Vec<Vehicle>> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(VehicleStatus::parse(value).map_err(RepoError::from)?),
        };
        debug!(backend = %self.repository.backend(), ?status, "Listing vehicles");
        Ok(self.repository.list(status).await?)
    }

    pub async fn update(&self, id: &str, patch: VehiclePatch) -> AppResult<Vehicle> {
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "specify at least one field to update".to_string(),
            ));
        }
        Ok(self.repository.update(id, patch).await?)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Ok(self.repository.remove(id).await?)
    }
}
