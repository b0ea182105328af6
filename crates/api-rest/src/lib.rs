//! # API REST
//!
//! REST API implementation for PRS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Session cookies and the authenticated-principal middleware
//! - REST-specific concerns (JSON envelopes, CORS, status mapping)
//!
//! Uses `api-shared` for wire types and `prs-core` for all data operations.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod session;

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::wire::{
    AuthRes, CreatePatientRes, FieldErrors, HealthRes, LoginReq, PatientDetail, PatientSummary,
    PatientWrite, RegisterReq, StatsRes, UserPublic, ValidationErrorRes,
};
use api_shared::HealthService;
use prs_core::{
    shared_session_cache, AccountService, Database, PatientService, SharedSessionCache,
};

/// Application state shared across REST API handlers.
///
/// Contains the services needed by the REST API endpoints and the shared
/// session cache.
#[derive(Clone)]
pub struct AppState {
    pub patients: PatientService,
    pub accounts: AccountService,
    pub sessions: SharedSessionCache,
}

impl AppState {
    /// Builds the application state over one database handle.
    pub fn new(db: Database) -> Self {
        Self {
            patients: PatientService::new(db.clone()),
            accounts: AccountService::new(db),
            sessions: shared_session_cache(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        handlers::patients::list_patients,
        handlers::patients::create_patient,
        handlers::patients::retrieve_patient,
        handlers::patients::update_patient,
        handlers::patients::delete_patient,
        handlers::patients::patient_stats,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::register,
        handlers::auth::profile,
    ),
    components(schemas(
        HealthRes,
        PatientDetail,
        PatientSummary,
        PatientWrite,
        CreatePatientRes,
        ValidationErrorRes,
        FieldErrors,
        StatsRes,
        UserPublic,
        LoginReq,
        RegisterReq,
        AuthRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router.
///
/// Routes follow the Django-era paths with trailing slashes; `/profile/` is
/// the only endpoint behind the session middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/patients/",
            get(handlers::patients::list_patients).post(handlers::patients::create_patient),
        )
        .route(
            "/patients/:patient_id/",
            get(handlers::patients::retrieve_patient)
                .put(handlers::patients::update_patient)
                .patch(handlers::patients::update_patient)
                .delete(handlers::patients::delete_patient),
        )
        .route("/stats/", get(handlers::patients::patient_stats))
        .route("/login/", post(handlers::auth::login))
        .route("/logout/", post(handlers::auth::logout))
        .route("/register/", post(handlers::auth::register))
        .route(
            "/profile/",
            get(handlers::auth::profile).route_layer(middleware::from_fn_with_state(
                state.clone(),
                session::require_session,
            )),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the PRS service. Used for monitoring
/// and load balancer health checks.
async fn health() -> (StatusCode, Json<HealthRes>) {
    (StatusCode::OK, Json(HealthService::check_health()))
}
