//! PostgreSQL backend
//!
//! One `vehicles` table, `id` as primary key. `seq` records insertion order
//! so listings come back in the order vehicles were added, matching the
//! file backend. Connections are checked out of the pool per statement and
//! returned on drop, failed statements included.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder};
use tracing::info;

use super::VehicleRepository;
use crate::config::BackendKind;
use crate::models::vehicle::today;
use crate::models::{Vehicle, VehiclePatch, VehicleStatus};
use crate::utils::errors::{RepoError, RepoResult};

const TABLE: &str = "vehicles";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS vehicles (
    seq         BIGSERIAL NOT NULL,
    id          TEXT PRIMARY KEY,
    plate       TEXT NOT NULL,
    model       TEXT NOT NULL,
    year        INTEGER NOT NULL,
    mileage     BIGINT NOT NULL CHECK (mileage >= 0),
    status      TEXT NOT NULL DEFAULT 'available'
                CHECK (status IN ('available', 'in_use', 'in_maintenance', 'retired')),
    notes       TEXT NOT NULL DEFAULT '',
    updated_on  DATE
)
"#;

const SELECT_VEHICLES: &str =
    "SELECT id, plate, model, year, mileage, status, notes, updated_on FROM vehicles";

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: String,
    plate: String,
    model: String,
    year: i32,
    mileage: i64,
    status: String,
    notes: String,
    updated_on: Option<NaiveDate>,
}

impl VehicleRow {
    fn into_vehicle(self) -> RepoResult<Vehicle> {
        let status = VehicleStatus::parse(&self.status)
            .map_err(|e| RepoError::corrupt(TABLE, format!("vehicle '{}': {}", self.id, e)))?;
        Ok(Vehicle {
            id: self.id,
            plate: self.plate,
            model: self.model,
            year: self.year,
            mileage: self.mileage,
            status,
            notes: self.notes,
            updated_on: self.updated_on,
        })
    }
}

/// `UPDATE` touching only the supplied columns, plus `updated_on`
fn build_update(id: &str, patch: &VehiclePatch, merged: &Vehicle) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE vehicles SET ");
    {
        let mut set = builder.separated(", ");

        if patch.plate.is_some() {
            set.push("plate = ").push_bind_unseparated(merged.plate.clone());
        }
        if patch.model.is_some() {
            set.push("model = ").push_bind_unseparated(merged.model.clone());
        }
        if patch.year.is_some() {
            set.push("year = ").push_bind_unseparated(merged.year);
        }
        if patch.mileage.is_some() {
            set.push("mileage = ").push_bind_unseparated(merged.mileage);
        }
        if patch.status.is_some() {
            set.push("status = ").push_bind_unseparated(merged.status.as_str());
        }
        if patch.notes.is_some() {
            set.push("notes = ").push_bind_unseparated(merged.notes.clone());
        }
        set.push("updated_on = ").push_bind_unseparated(merged.updated_on);
    }

    builder.push(" WHERE id = ").push_bind(id.to_string());
    builder
}

/// Vehicle repository backed by a PostgreSQL table
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn add(&self, vehicle: Vehicle) -> RepoResult<()> {
        let vehicle = vehicle.normalized(today())?;

        sqlx::query(
            r#"
            INSERT INTO vehicles (id, plate, model, year, mileage, status, notes, updated_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&vehicle.id)
        .bind(&vehicle.plate)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.mileage)
        .bind(vehicle.status.as_str())
        .bind(&vehicle.notes)
        .bind(vehicle.updated_on)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepoError::DuplicateId(vehicle.id.clone());
                }
            }
            RepoError::from(e)
        })?;

        info!(vehicle_id = %vehicle.id, backend = "relational", "Vehicle added");
        Ok(())
    }

    async fn get(&self, id: &str) -> RepoResult<Vehicle> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_VEHICLES);
        query.push(" WHERE id = ").push_bind(id);

        query
            .build_query_as::<VehicleRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?
            .into_vehicle()
    }

    async fn list(&self, status: Option<VehicleStatus>) -> RepoResult<Vec<Vehicle>> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_VEHICLES);
        if let Some(status) = status {
            query.push(" WHERE status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY seq");

        query
            .build_query_as::<VehicleRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(VehicleRow::into_vehicle)
            .collect()
    }

    async fn update(&self, id: &str, patch: VehiclePatch) -> RepoResult<Vehicle> {
        let current = self.get(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let merged = patch.apply_to(&current, today())?;
        let result = build_update(id, &patch, &merged)
            .build()
            .execute(&self.pool)
            .await?;

        // Removed between the read and the write.
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        info!(vehicle_id = %id, backend = "relational", "Vehicle updated");
        Ok(merged)
    }

    async fn remove(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        info!(vehicle_id = %id, backend = "relational", "Vehicle removed");
        Ok(())
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Relational
    }
}
