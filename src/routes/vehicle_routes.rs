use axum::{
    extract::{FromRequest, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::vehicle_dto::{
    ApiResponse, CreateVehicleRequest, ListQuery, UpdateVehicleRequest, VehicleResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `Json` whose rejections go through `AppError`, so malformed bodies get the
/// same error body as every other bad input
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct ApiJson<T>(T);

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

async fn create_vehicle(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleResponse>>), AppError> {
    let vehicle = state.vehicles().create(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehicle added".to_string(),
        )),
    ))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VehicleResponse>, AppError> {
    let vehicle = state.vehicles().get(&id).await?;
    Ok(Json(vehicle.into()))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let vehicles = state.vehicles().list(query.status.as_deref()).await?;
    Ok(Json(vehicles.into_iter().map(VehicleResponse::from).collect()))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let vehicle = state.vehicles().update(&id, request.into()).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehicle updated".to_string(),
    )))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.vehicles().delete(&id).await?;
    Ok(Json(ApiResponse::message(format!("Vehicle {id} removed"))))
}
