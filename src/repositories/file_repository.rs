//! JSON file backend
//!
//! The whole collection lives in one JSON object mapping vehicle ids to
//! their fields. Every call loads the full document; mutations apply the
//! change in memory and write the full document back through a temporary
//! file in the same directory followed by a rename, so readers only ever
//! see the old or the new document.
//!
//! Mutations are serialized within one process. Nothing coordinates several
//! processes writing the same file: run a single writer.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::VehicleRepository;
use crate::config::BackendKind;
use crate::models::vehicle::today;
use crate::models::{Vehicle, VehiclePatch, VehicleStatus};
use crate::utils::errors::{RepoError, RepoResult};

/// Fields stored under each id
#[derive(Debug, Serialize, Deserialize)]
struct StoredVehicle {
    plate: String,
    model: String,
    year: i32,
    mileage: i64,
    #[serde(default)]
    status: VehicleStatus,
    #[serde(default)]
    notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_on: Option<NaiveDate>,
}

impl StoredVehicle {
    fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            plate: vehicle.plate.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            mileage: vehicle.mileage,
            status: vehicle.status,
            notes: vehicle.notes.clone(),
            updated_on: vehicle.updated_on,
        }
    }

    fn into_vehicle(self, id: String) -> Vehicle {
        Vehicle {
            id,
            plate: self.plate,
            model: self.model,
            year: self.year,
            mileage: self.mileage,
            status: self.status,
            notes: self.notes,
            updated_on: self.updated_on,
        }
    }
}

/// Serializes a collection as an id-keyed object, entries in slice order
struct DocumentRef<'a>(&'a [Vehicle]);

impl Serialize for DocumentRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for vehicle in self.0 {
            map.serialize_entry(&vehicle.id, &StoredVehicle::from_vehicle(vehicle))?;
        }
        map.end()
    }
}

/// Collection read back in document order
struct Document(Vec<Vehicle>);

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping vehicle ids to vehicles")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Document, A::Error> {
                let mut seen = HashSet::new();
                let mut vehicles = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, stored)) = access.next_entry::<String, StoredVehicle>()? {
                    if !seen.insert(id.clone()) {
                        return Err(de::Error::custom(format!("duplicate vehicle id '{}'", id)));
                    }
                    vehicles.push(stored.into_vehicle(id));
                }
                Ok(Document(vehicles))
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Vehicle repository backed by a single JSON document
pub struct FileVehicleRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileVehicleRepository {
    /// The file is not touched until the first operation; a missing file is
    /// an empty collection.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RepoResult<Vec<Vehicle>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let Document(vehicles) =
            serde_json::from_slice::<Document>(&bytes).map_err(|e| RepoError::corrupt(&self.path, e))?;

        // Persisted records must still satisfy the model. A missing
        // `updated_on` stays missing until the record itself changes.
        let today = today();
        vehicles
            .iter()
            .map(|vehicle| {
                vehicle
                    .normalized(today)
                    .map(|normalized| Vehicle {
                        updated_on: vehicle.updated_on,
                        ..normalized
                    })
                    .map_err(|e| {
                        RepoError::corrupt(&self.path, format!("vehicle '{}': {}", vehicle.id, e))
                    })
            })
            .collect()
    }

    async fn save(&self, vehicles: &[Vehicle]) -> RepoResult<()> {
        let mut body = serde_json::to_vec_pretty(&DocumentRef(vehicles)).map_err(io::Error::from)?;
        body.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_and_rename(&temp_path, &self.path, &body).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        debug!(path = %self.path.display(), count = vehicles.len(), "Store written");
        Ok(())
    }

    /// Unique sibling of the target: `.<file>.<uuid>.tmp`
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vehicles.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}

async fn write_and_rename(temp_path: &Path, target: &Path, body: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp_path, target).await
}

#[async_trait]
impl VehicleRepository for FileVehicleRepository {
    async fn add(&self, vehicle: Vehicle) -> RepoResult<()> {
        let vehicle = vehicle.normalized(today())?;

        let _guard = self.write_lock.lock().await;
        let mut vehicles = self.load().await?;
        if vehicles.iter().any(|v| v.id == vehicle.id) {
            return Err(RepoError::DuplicateId(vehicle.id));
        }

        let id = vehicle.id.clone();
        vehicles.push(vehicle);
        self.save(&vehicles).await?;
        info!(vehicle_id = %id, backend = "file", "Vehicle added");
        Ok(())
    }

    async fn get(&self, id: &str) -> RepoResult<Vehicle> {
        self.load()
            .await?
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    async fn list(&self, status: Option<VehicleStatus>) -> RepoResult<Vec<Vehicle>> {
        let vehicles = self.load().await?;
        Ok(match status {
            Some(status) => vehicles.into_iter().filter(|v| v.status == status).collect(),
            None => vehicles,
        })
    }

    async fn update(&self, id: &str, patch: VehiclePatch) -> RepoResult<Vehicle> {
        let _guard = self.write_lock.lock().await;
        let mut vehicles = self.load().await?;
        let index = vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        if patch.is_empty() {
            return Ok(vehicles.swap_remove(index));
        }

        let merged = patch.apply_to(&vehicles[index], today())?;
        vehicles[index] = merged.clone();
        self.save(&vehicles).await?;
        info!(vehicle_id = %id, backend = "file", "Vehicle updated");
        Ok(merged)
    }

    async fn remove(&self, id: &str) -> RepoResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut vehicles = self.load().await?;
        let index = vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        vehicles.remove(index);
        self.save(&vehicles).await?;
        info!(vehicle_id = %id, backend = "file", "Vehicle removed");
        Ok(())
    }

    fn backend(&self) -> BackendKind {
        BackendKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleDraft;

    fn vehicle(id: &str, status: &str) -> Vehicle {
        VehicleDraft::new(id, "ab123cd", "Fiat Panda", 2021, 35500)
            .status(status)
            .validate()
            .unwrap()
    }

    #[test]
    fn test_document_keeps_entry_order() {
        let vehicles = vec![
            vehicle("V9", "available"),
            vehicle("V1", "retired"),
            vehicle("V5", "in_use"),
        ];
        let json = serde_json::to_string(&DocumentRef(&vehicles)).unwrap();
        let v9 = json.find("\"V9\"").unwrap();
        let v1 = json.find("\"V1\"").unwrap();
        let v5 = json.find("\"V5\"").unwrap();
        assert!(v9 < v1 && v1 < v5);

        let Document(read_back) = serde_json::from_str::<Document>(&json).unwrap();
        let ids: Vec<&str> = read_back.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["V9", "V1", "V5"]);
        assert_eq!(read_back, vehicles);
    }

    #[test]
    fn test_document_field_names() {
        let json = serde_json::to_value(DocumentRef(&[vehicle("V001", "in_maintenance")])).unwrap();
        let entry = &json["V001"];
        assert_eq!(entry["plate"], "AB123CD");
        assert_eq!(entry["model"], "Fiat Panda");
        assert_eq!(entry["year"], 2021);
        assert_eq!(entry["mileage"], 35500);
        assert_eq!(entry["status"], "in_maintenance");
        assert_eq!(entry["notes"], "");
    }

    #[test]
    fn test_document_rejects_duplicate_ids_and_non_objects() {
        let duplicated = r#"{"V1": {"plate":"A","model":"B","year":2020,"mileage":1},
                             "V1": {"plate":"C","model":"D","year":2020,"mileage":2}}"#;
        assert!(serde_json::from_str::<Document>(duplicated).is_err());
        assert!(serde_json::from_str::<Document>("[]").is_err());
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let json = r#"{"V1": {"plate":"A1","model":"Ducato","year":2019,"mileage":0}}"#;
        let Document(vehicles) = serde_json::from_str::<Document>(json).unwrap();
        assert_eq!(vehicles[0].status, VehicleStatus::Available);
        assert_eq!(vehicles[0].notes, "");
        assert_eq!(vehicles[0].updated_on, None);
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let repository = FileVehicleRepository::new("/srv/fleet/vehicles.json");
        let temp = repository.temp_path();
        assert_eq!(temp.parent(), Some(Path::new("/srv/fleet")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".vehicles.json."));
        assert!(name.ends_with(".tmp"));
        assert_ne!(temp, repository.temp_path());
    }
}
