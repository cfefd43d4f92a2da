use tracing::debug;

use super::{Cli, Command};
use crate::controllers::vehicle_controller::VehicleController;
use crate::models::{Vehicle, VehicleDraft, VehiclePatch};
use crate::repositories::open_repository;
use crate::utils::errors::AppResult;

/// Exit code for bad invocations, matching clap's own
const USAGE_EXIT: i32 = 2;

/// Run one command and return the process exit code
pub async fn run(cli: Cli) -> i32 {
    let config = match cli.storage.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return USAGE_EXIT;
        }
    };

    debug!(backend = %config.backend, "Opening repository");
    let repository = match open_repository(&config).await {
        Ok(repository) => repository,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    let controller = VehicleController::new(repository);
    match execute(&controller, cli.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

async fn execute(controller: &VehicleController, command: Command) -> AppResult<String> {
    match command {
        Command::Add {
            id,
            plate,
            model,
            year,
            mileage,
            status,
            notes,
        } => {
            let draft = VehicleDraft {
                id,
                plate,
                model,
                year,
                mileage,
                status,
                notes,
                updated_on: None,
            };
            let vehicle = controller.create(draft).await?;
            Ok(format!("Vehicle {} added.", vehicle.id))
        }

        Command::List { status } => {
            let vehicles = controller.list(status.as_deref()).await?;
            if vehicles.is_empty() {
                return Ok("No vehicles found.".to_string());
            }
            Ok(vehicles
                .iter()
                .map(list_line)
                .collect::<Vec<_>>()
                .join("\n"))
        }

        Command::Show { id } => Ok(details(&controller.get(&id).await?)),

        Command::Update {
            id,
            plate,
            model,
            year,
            mileage,
            status,
            notes,
        } => {
            let patch = VehiclePatch {
                plate,
                model,
                year,
                mileage,
                status,
                notes,
            };
            let vehicle = controller.update(&id, patch).await?;
            Ok(format!("Vehicle {} updated.", vehicle.id))
        }

        Command::Remove { id } => {
            controller.delete(&id).await?;
            Ok(format!("Vehicle {id} removed."))
        }
    }
}

fn updated_on(vehicle: &Vehicle) -> String {
    vehicle
        .updated_on
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn list_line(vehicle: &Vehicle) -> String {
    [
        vehicle.id.clone(),
        vehicle.plate.clone(),
        vehicle.model.clone(),
        vehicle.year.to_string(),
        vehicle.mileage.to_string(),
        vehicle.status.to_string(),
        updated_on(vehicle),
    ]
    .join(" | ")
}

fn details(vehicle: &Vehicle) -> String {
    format!(
        "id:         {}\nplate:      {}\nmodel:      {}\nyear:       {}\nmileage:    {}\nstatus:     {}\nnotes:      {}\nupdated_on: {}",
        vehicle.id,
        vehicle.plate,
        vehicle.model,
        vehicle.year,
        vehicle.mileage,
        vehicle.status,
        vehicle.notes,
        updated_on(vehicle),
    )
}
