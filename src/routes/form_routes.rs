//! Browser form over the vehicle registry
//!
//! Every handler hands raw form text to the controller; errors re-render the
//! page with the message and the matching status code.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::warn;

use super::templates;
use crate::dto::vehicle_dto::{ListQuery, VehicleForm};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_form_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/add", get(add_form).post(add_vehicle))
        .route("/edit/:id", get(edit_form).post(edit_vehicle))
        .route("/delete/:id", post(delete_vehicle))
}

fn error_page(error: &AppError) -> Response {
    (error.status_code(), Html(templates::error_page(&error.to_string()))).into_response()
}

async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let filter = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match state.vehicles().list(filter).await {
        Ok(mut vehicles) => {
            vehicles.sort_by(|a, b| a.id.cmp(&b.id));
            Html(templates::index(&vehicles, filter)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Listing vehicles failed");
            error_page(&e)
        }
    }
}

async fn add_form() -> Html<String> {
    Html(templates::vehicle_form(&VehicleForm::default(), None, None))
}

async fn add_vehicle(State(state): State<AppState>, Form(form): Form<VehicleForm>) -> Response {
    match state.vehicles().create(form.clone().into_draft()).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            warn!(vehicle_id = %form.id, error = %e, "Add form rejected");
            (
                e.status_code(),
                Html(templates::vehicle_form(&form, None, Some(&e.to_string()))),
            )
                .into_response()
        }
    }
}

async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.vehicles().get(&id).await {
        Ok(vehicle) => {
            Html(templates::vehicle_form(&VehicleForm::from(&vehicle), Some(&id), None))
                .into_response()
        }
        Err(e) => error_page(&e),
    }
}

async fn edit_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<VehicleForm>,
) -> Response {
    match state.vehicles().update(&id, form.clone().into_patch()).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) if e.status_code() == StatusCode::NOT_FOUND => error_page(&e),
        Err(e) => {
            warn!(vehicle_id = %id, error = %e, "Edit form rejected");
            (
                e.status_code(),
                Html(templates::vehicle_form(&form, Some(&id), Some(&e.to_string()))),
            )
                .into_response()
        }
    }
}

async fn delete_vehicle(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.vehicles().delete(&id).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            warn!(vehicle_id = %id, error = %e, "Delete failed");
            error_page(&e)
        }
    }
}
