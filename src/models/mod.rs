//! Data models
//!
//! The vehicle record and the raw forms it is validated from.

pub mod vehicle;

pub use vehicle::{validate_and_normalize, Vehicle, VehicleDraft, VehiclePatch, VehicleStatus};
