use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{Vehicle, VehicleDraft, VehiclePatch};

// Numbers may arrive as JSON numbers or strings; the model does the conversion.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn optional_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

// Request to create a vehicle
#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub year: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub mileage: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateVehicleRequest> for VehicleDraft {
    fn from(request: CreateVehicleRequest) -> Self {
        VehicleDraft {
            id: request.id,
            plate: request.plate,
            model: request.model,
            year: request.year,
            mileage: request.mileage,
            status: request.status,
            notes: request.notes,
            updated_on: None,
        }
    }
}

// Request to update a vehicle; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVehicleRequest {
    pub plate: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "optional_text_or_number")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "optional_text_or_number")]
    pub mileage: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<UpdateVehicleRequest> for VehiclePatch {
    fn from(request: UpdateVehicleRequest) -> Self {
        VehiclePatch {
            plate: request.plate,
            model: request.model,
            year: request.year,
            mileage: request.mileage,
            status: request.status,
            notes: request.notes,
        }
    }
}

/// Fields of the browser form. Every input is posted, possibly empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub mileage: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

impl VehicleForm {
    pub fn into_draft(self) -> VehicleDraft {
        VehicleDraft {
            id: self.id,
            plate: self.plate,
            model: self.model,
            year: self.year,
            mileage: self.mileage,
            status: Some(self.status),
            notes: Some(self.notes),
            updated_on: None,
        }
    }

    /// The edit form resubmits every field
    pub fn into_patch(self) -> VehiclePatch {
        VehiclePatch {
            plate: Some(self.plate),
            model: Some(self.model),
            year: Some(self.year),
            mileage: Some(self.mileage),
            status: Some(self.status),
            notes: Some(self.notes),
        }
    }
}

impl From<&Vehicle> for VehicleForm {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id.clone(),
            plate: vehicle.plate.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year.to_string(),
            mileage: vehicle.mileage.to_string(),
            status: vehicle.status.as_str().to_string(),
            notes: vehicle.notes.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

// Vehicle response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VehicleResponse {
    pub id: String,
    pub plate: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub status: String,
    pub notes: String,
    pub updated_on: Option<String>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            plate: vehicle.plate,
            model: vehicle.model,
            year: vehicle.year,
            mileage: vehicle.mileage,
            status: vehicle.status.as_str().to_string(),
            notes: vehicle.notes,
            updated_on: vehicle.updated_on.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
        }
    }
}
