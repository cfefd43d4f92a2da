//! Shared application state
//!
//! The state handed to every axum handler: the repository chosen at startup.

use std::sync::Arc;

use crate::controllers::vehicle_controller::VehicleController;
use crate::repositories::VehicleRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn VehicleRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn VehicleRepository>) -> Self {
        Self { repository }
    }

    pub fn vehicles(&self) -> VehicleController {
        VehicleController::new(self.repository.clone())
    }
}
