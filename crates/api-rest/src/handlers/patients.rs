//! Patient CRUD, search and statistics endpoints.

use api_shared::wire::{CreatePatientRes, PatientDetail, PatientSummary, PatientWrite, StatsRes};
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use prs_core::PatientError;

use crate::error::ApiError;
use crate::AppState;

/// Query parameters for the patient list endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListParams {
    /// Case-insensitive substring matched against first name, last name,
    /// patient id or phone number.
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/patients/",
    params(ListParams),
    responses(
        (status = 200, description = "Patients, most recently created first", body = [PatientSummary]),
        (status = 500, description = "Internal server error")
    )
)]
/// List or search patients
///
/// Returns summary projections of all patients, most recently created first.
/// With a `search` term, only patients whose first name, last name, patient
/// id or phone number contains the term are returned.
///
/// # Errors
/// Returns `500 Internal Server Error` if the store query fails.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let patients = state.patients.list(params.search.as_deref())?;

    let today = Utc::now().date_naive();
    Ok(Json(
        patients.iter().map(|p| p.to_summary(today)).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/patients/",
    request_body = PatientWrite,
    responses(
        (status = 201, description = "Patient created", body = CreatePatientRes),
        (status = 400, description = "Validation failure with per-field errors"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new patient record
///
/// Validates the payload, assigns the next year-scoped patient identifier
/// and persists the record. On validation failure every field error is
/// reported and nothing is persisted.
///
/// # Errors
/// Returns `400 Bad Request` with `{message, errors}` when validation fails.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    Json(input): Json<PatientWrite>,
) -> Result<(StatusCode, Json<CreatePatientRes>), ApiError> {
    let patient = state.patients.create(&input).map_err(|e| match e {
        PatientError::Validation(errors) => ApiError::validation("Registration failed", errors),
        other => other.into(),
    })?;

    let today = Utc::now().date_naive();
    Ok((
        StatusCode::CREATED,
        Json(CreatePatientRes {
            message: "Patient registered successfully".into(),
            data: patient.to_detail(today),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Full patient projection", body = PatientDetail),
        (status = 404, description = "Unknown patient id")
    )
)]
/// Retrieve one patient
#[axum::debug_handler]
pub async fn retrieve_patient(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<Json<PatientDetail>, ApiError> {
    let patient = state.patients.get(&patient_id)?;
    Ok(Json(patient.to_detail(Utc::now().date_naive())))
}

#[utoipa::path(
    put,
    path = "/patients/{patient_id}/",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    request_body = PatientWrite,
    responses(
        (status = 200, description = "Updated patient projection", body = PatientDetail),
        (status = 400, description = "Validation failure with per-field errors"),
        (status = 404, description = "Unknown patient id")
    )
)]
/// Update a patient record
///
/// Accepts partial field sets: absent fields stay unchanged. Serves both PUT
/// and PATCH. `patient_id`, `created_at` and `updated_at` are server-managed
/// and cannot be written.
///
/// # Errors
/// Returns `400 Bad Request` with `{message, errors}` when a supplied field
/// is invalid, `404 Not Found` for an unknown id.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
    Json(input): Json<PatientWrite>,
) -> Result<Json<PatientDetail>, ApiError> {
    let patient = state
        .patients
        .update(&patient_id, &input)
        .map_err(|e| match e {
            PatientError::Validation(errors) => ApiError::validation("Update failed", errors),
            other => other.into(),
        })?;
    Ok(Json(patient.to_detail(Utc::now().date_naive())))
}

#[utoipa::path(
    delete,
    path = "/patients/{patient_id}/",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "Unknown patient id")
    )
)]
/// Delete a patient record
///
/// Hard delete; there are no cascading side effects.
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    state.patients.delete(&patient_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/stats/",
    responses(
        (status = 200, description = "Aggregate patient counts", body = StatsRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Aggregate patient statistics
///
/// Total patient count and the count for each gender value.
#[axum::debug_handler]
pub async fn patient_stats(State(state): State<AppState>) -> Result<Json<StatsRes>, ApiError> {
    Ok(Json(state.patients.stats()?))
}
