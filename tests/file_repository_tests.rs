use std::path::Path;

use fleet_registry::models::vehicle::today;
use fleet_registry::models::{Vehicle, VehicleDraft, VehiclePatch, VehicleStatus};
use fleet_registry::repositories::{FileVehicleRepository, VehicleRepository};
use fleet_registry::utils::errors::{RepoError, ValidationKind};
use tempfile::TempDir;

fn vehicle(id: &str, status: &str) -> Vehicle {
    VehicleDraft::new(id, "ab123cd", "Fiat Panda", 2021, 35500)
        .status(status)
        .validate()
        .unwrap()
}

fn repository(dir: &TempDir) -> FileVehicleRepository {
    FileVehicleRepository::new(dir.path().join("vehicles.json"))
}

fn temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[tokio::test]
async fn test_add_then_get_round_trips() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    let v = vehicle("V001", "available");
    repo.add(v.clone()).await.unwrap();

    assert_eq!(repo.get("V001").await.unwrap(), v);
    // A fresh handle reads the same document.
    assert_eq!(repository(&dir).get("V001").await.unwrap(), v);
}

#[tokio::test]
async fn test_plate_is_normalized_on_add() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    let mut v = vehicle("V001", "available");
    v.plate = "  ab123cd ".to_string();
    repo.add(v).await.unwrap();

    assert_eq!(repo.get("V001").await.unwrap().plate, "AB123CD");
}

#[tokio::test]
async fn test_duplicate_id_leaves_record_unchanged() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    let first = vehicle("V001", "available");
    repo.add(first.clone()).await.unwrap();

    let mut second = vehicle("V001", "retired");
    second.model = "Fiat Ducato".to_string();
    let err = repo.add(second).await.unwrap_err();

    assert!(matches!(err, RepoError::DuplicateId(ref id) if id == "V001"));
    assert_eq!(repo.get("V001").await.unwrap(), first);
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_twice_fails_with_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    repo.add(vehicle("V001", "available")).await.unwrap();

    repo.remove("V001").await.unwrap();
    let err = repo.remove("V001").await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_partial_update_preserves_other_fields() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    let original = VehicleDraft::new("V001", "AB123CD", "Fiat Panda", 2021, 35500)
        .status("in_use")
        .notes("spare key in office")
        .validate()
        .unwrap();
    repo.add(original.clone()).await.unwrap();

    let patch = VehiclePatch {
        mileage: Some("40000".to_string()),
        ..Default::default()
    };
    let updated = repo.update("V001", patch).await.unwrap();

    assert_eq!(updated.mileage, 40000);
    assert_eq!(updated.plate, original.plate);
    assert_eq!(updated.model, original.model);
    assert_eq!(updated.year, original.year);
    assert_eq!(updated.status, original.status);
    assert_eq!(updated.notes, original.notes);
    assert_eq!(updated.updated_on, Some(today()));
    assert_eq!(repo.get("V001").await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    let patch = VehiclePatch {
        notes: Some("x".to_string()),
        ..Default::default()
    };
    let err = repo.update("nope", patch).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_update_is_rejected_before_writing() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    let original = vehicle("V001", "available");
    repo.add(original.clone()).await.unwrap();
    let before = std::fs::read(repo.path()).unwrap();

    let patch = VehiclePatch {
        year: Some("1850".to_string()),
        ..Default::default()
    };
    let err = repo.update("V001", patch).await.unwrap_err();

    match err {
        RepoError::Validation(e) => assert_eq!(e.kind, ValidationKind::OutOfRange),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(std::fs::read(repo.path()).unwrap(), before);
}

#[tokio::test]
async fn test_list_filters_by_status_in_stored_order() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    for (id, status) in [
        ("V3", "in_use"),
        ("V1", "available"),
        ("V4", "in_use"),
        ("V2", "retired"),
        ("V0", "in_use"),
    ] {
        repo.add(vehicle(id, status)).await.unwrap();
    }

    let in_use: Vec<String> = repo
        .list(Some(VehicleStatus::InUse))
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(in_use, ["V3", "V4", "V0"]);

    let all: Vec<String> = repo.list(None).await.unwrap().into_iter().map(|v| v.id).collect();
    assert_eq!(all, ["V3", "V1", "V4", "V2", "V0"]);

    assert!(repo
        .list(Some(VehicleStatus::InMaintenance))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_negative_mileage_rejected_and_collection_unchanged() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    repo.add(vehicle("V001", "available")).await.unwrap();

    let mut bad = vehicle("V002", "available");
    bad.mileage = -1;
    let err = repo.add(bad).await.unwrap_err();

    match err {
        RepoError::Validation(e) => {
            assert_eq!(e.kind, ValidationKind::OutOfRange);
            assert_eq!(e.field, "mileage");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    let ids: Vec<String> = repo.list(None).await.unwrap().into_iter().map(|v| v.id).collect();
    assert_eq!(ids, ["V001"]);
}

#[tokio::test]
async fn test_add_update_remove_scenario() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    repo.add(vehicle("V001", "available")).await.unwrap();
    assert_eq!(repo.get("V001").await.unwrap().plate, "AB123CD");

    let patch = VehiclePatch {
        mileage: Some("36000".to_string()),
        status: Some("in_maintenance".to_string()),
        ..Default::default()
    };
    repo.update("V001", patch).await.unwrap();

    let stored = repo.get("V001").await.unwrap();
    assert_eq!(stored.mileage, 36000);
    assert_eq!(stored.status, VehicleStatus::InMaintenance);
    assert_eq!(stored.plate, "AB123CD");
    assert_eq!(stored.model, "Fiat Panda");
    assert_eq!(stored.year, 2021);

    repo.remove("V001").await.unwrap();
    assert!(matches!(
        repo.get("V001").await.unwrap_err(),
        RepoError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_missing_file_is_an_empty_collection() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    assert!(repo.list(None).await.unwrap().is_empty());
    assert!(!repo.path().exists());
}

#[tokio::test]
async fn test_malformed_document_is_corrupt_store() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    std::fs::write(repo.path(), "{ not json").unwrap();

    assert!(matches!(
        repo.list(None).await.unwrap_err(),
        RepoError::CorruptStore { .. }
    ));
    assert!(matches!(
        repo.add(vehicle("V001", "available")).await.unwrap_err(),
        RepoError::CorruptStore { .. }
    ));
    // Never repaired automatically.
    assert_eq!(std::fs::read_to_string(repo.path()).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_invalid_stored_record_is_corrupt_store() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    std::fs::write(
        repo.path(),
        r#"{"V1": {"plate":"A1","model":"Ducato","year":2019,"mileage":10,"status":"stolen"}}"#,
    )
    .unwrap();

    assert!(matches!(
        repo.get("V1").await.unwrap_err(),
        RepoError::CorruptStore { .. }
    ));
}

#[tokio::test]
async fn test_leftover_temp_file_does_not_affect_document() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    repo.add(vehicle("V001", "available")).await.unwrap();

    // What a crash between write and rename leaves behind.
    std::fs::write(dir.path().join(".vehicles.json.deadbeef.tmp"), "{\"trunc").unwrap();

    assert_eq!(repo.list(None).await.unwrap().len(), 1);
    repo.add(vehicle("V002", "retired")).await.unwrap();
    assert_eq!(repo.list(None).await.unwrap().len(), 2);
    assert_eq!(temp_files(dir.path()), [".vehicles.json.deadbeef.tmp"]);
}

#[tokio::test]
async fn test_writes_leave_no_temp_files_and_pretty_json() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    repo.add(vehicle("V001", "available")).await.unwrap();
    repo.add(vehicle("V002", "in_use")).await.unwrap();
    repo.remove("V001").await.unwrap();

    assert!(temp_files(dir.path()).is_empty());

    let text = std::fs::read_to_string(repo.path()).unwrap();
    assert!(text.ends_with('\n'));
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["V002"]["status"], "in_use");
    assert!(document.get("V001").is_none());
}

#[tokio::test]
async fn test_parent_directory_created_on_first_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("fleet").join("vehicles.json");
    let repo = FileVehicleRepository::new(&path);

    repo.add(vehicle("V001", "available")).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_unrelated_writes_keep_missing_updated_on() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    std::fs::write(
        repo.path(),
        r#"{"OLD": {"plate":"A1","model":"Ducato","year":2019,"mileage":10,"status":"in_use","notes":""}}"#,
    )
    .unwrap();

    assert_eq!(repo.get("OLD").await.unwrap().updated_on, None);

    repo.add(vehicle("V001", "available")).await.unwrap();
    let patch = VehiclePatch {
        mileage: Some("11".to_string()),
        ..Default::default()
    };
    repo.update("V001", patch).await.unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(repo.path()).unwrap()).unwrap();
    assert!(document["OLD"].get("updated_on").is_none());
    assert_eq!(document["V001"]["updated_on"], today().to_string());
    assert_eq!(repo.get("OLD").await.unwrap().updated_on, None);

    // Changing the record itself stamps it.
    let patch = VehiclePatch {
        notes: Some("serviced".to_string()),
        ..Default::default()
    };
    let touched = repo.update("OLD", patch).await.unwrap();
    assert_eq!(touched.updated_on, Some(today()));
}
