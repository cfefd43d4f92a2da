//! Vehicle model
//!
//! This module contains the `Vehicle` record and the raw forms it is built
//! from: `VehicleDraft` for creation and `VehiclePatch` for partial updates.
//! Both front ends hand over text; the conversion into a typed, normalized
//! record happens here and nowhere else.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::errors::ValidationError;
use crate::utils::validation::{
    parse_integer, validate_enum, validate_non_negative, validate_not_empty, validate_range,
};

/// Oldest accepted registration year
pub const MIN_YEAR: i32 = 1900;

/// Current UTC calendar day, the reference for year bounds and `updated_on`
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Vehicle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Available,
    InUse,
    InMaintenance,
    Retired,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::Available,
        VehicleStatus::InUse,
        VehicleStatus::InMaintenance,
        VehicleStatus::Retired,
    ];

    const NAMES: [(&'static str, VehicleStatus); 4] = [
        ("available", VehicleStatus::Available),
        ("in_use", VehicleStatus::InUse),
        ("in_maintenance", VehicleStatus::InMaintenance),
        ("retired", VehicleStatus::Retired),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::InUse => "in_use",
            VehicleStatus::InMaintenance => "in_maintenance",
            VehicleStatus::Retired => "retired",
        }
    }

    /// Parse a status name, rejecting anything outside the fixed set
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        validate_enum("status", value, &Self::NAMES)
    }
}

impl FromStr for VehicleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, normalized vehicle record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub plate: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub status: VehicleStatus,
    pub notes: String,
    pub updated_on: Option<NaiveDate>,
}

impl Vehicle {
    /// Back to raw text form, keeping `updated_on`
    pub fn to_draft(&self) -> VehicleDraft {
        VehicleDraft {
            id: self.id.clone(),
            plate: self.plate.clone(),
            model: self.model.clone(),
            year: self.year.to_string(),
            mileage: self.mileage.to_string(),
            status: Some(self.status.as_str().to_string()),
            notes: Some(self.notes.clone()),
            updated_on: self.updated_on,
        }
    }

    /// Re-run the model rules on an already built record.
    ///
    /// Backends call this on every write path, so a `Vehicle` assembled by
    /// hand is normalized exactly like one coming from a draft.
    pub fn normalized(&self, today: NaiveDate) -> Result<Vehicle, ValidationError> {
        validate_and_normalize(self.to_draft(), today)
    }
}

/// Raw fields for a new vehicle, as received from a front end
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleDraft {
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
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(skip)]
    pub updated_on: Option<NaiveDate>,
}

impl VehicleDraft {
    pub fn new(
        id: impl Into<String>,
        plate: impl Into<String>,
        model: impl Into<String>,
        year: impl ToString,
        mileage: impl ToString,
    ) -> Self {
        Self {
            id: id.into(),
            plate: plate.into(),
            model: model.into(),
            year: year.to_string(),
            mileage: mileage.to_string(),
            ..Default::default()
        }
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validate against today's UTC date
    pub fn validate(self) -> Result<Vehicle, ValidationError> {
        validate_and_normalize(self, today())
    }
}

/// Turn raw fields into a canonical `Vehicle`.
///
/// `today` bounds the registration year (`MIN_YEAR..=today.year() + 1`) and
/// stamps `updated_on` when the draft carries none. Blank `status` means
/// `available`; blank `notes` means empty notes.
pub fn validate_and_normalize(
    draft: VehicleDraft,
    today: NaiveDate,
) -> Result<Vehicle, ValidationError> {
    let id = validate_not_empty("id", &draft.id)?;
    let plate = validate_not_empty("plate", &draft.plate)?.to_uppercase();
    let model = validate_not_empty("model", &draft.model)?;

    let year = parse_integer::<i32>("year", &validate_not_empty("year", &draft.year)?)?;
    let year = validate_range("year", year, MIN_YEAR, today.year() + 1)?;

    let mileage = parse_integer::<i64>("mileage", &validate_not_empty("mileage", &draft.mileage)?)?;
    let mileage = validate_non_negative("mileage", mileage)?;

    let status = match draft.status.as_deref().map(str::trim) {
        None | Some("") => VehicleStatus::default(),
        Some(value) => VehicleStatus::parse(value)?,
    };

    let notes = draft
        .notes
        .map(|n| n.trim().to_string())
        .unwrap_or_default();

    Ok(Vehicle {
        id,
        plate,
        model,
        year,
        mileage,
        status,
        notes,
        updated_on: Some(draft.updated_on.unwrap_or(today)),
    })
}

/// Partial update: only supplied fields change. `id` is not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehiclePatch {
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub mileage: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.plate.is_none()
            && self.model.is_none()
            && self.year.is_none()
            && self.mileage.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }

    /// Merge onto `current` and validate the merged record as a whole.
    /// `updated_on` is restamped with `today`.
    pub fn apply_to(&self, current: &Vehicle, today: NaiveDate) -> Result<Vehicle, ValidationError> {
        let mut draft = current.to_draft();

        if let Some(plate) = &self.plate {
            draft.plate = plate.clone();
        }
        if let Some(model) = &self.model {
            draft.model = model.clone();
        }
        if let Some(year) = &self.year {
            draft.year = year.clone();
        }
        if let Some(mileage) = &self.mileage {
            draft.mileage = mileage.clone();
        }
        if let Some(status) = &self.status {
            // A supplied status must name a value; blank does not fall back to the default.
            VehicleStatus::parse(status)?;
            draft.status = Some(status.clone());
        }
        if let Some(notes) = &self.notes {
            draft.notes = Some(notes.clone());
        }
        draft.updated_on = None;

        validate_and_normalize(draft, today)
    }
}
