//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `prs-run` binary is the deployment entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use prs_core::{database_path_from_env_value, CoreConfig, Database};

/// Main entry point for the PRS REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
/// Provides HTTP endpoints for patient and account operations with
/// OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `PRS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `PRS_DATABASE_PATH`: SQLite database file (default: "patient_records.db")
///
/// # Returns
/// * `Ok(())` - If server starts and runs successfully
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the database cannot be opened or bootstrapped,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PRS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = CoreConfig::new(database_path_from_env_value(
        std::env::var("PRS_DATABASE_PATH").ok(),
    ));

    tracing::info!("-- Starting PRS REST API on {}", addr);
    tracing::info!("-- Patient records database: {}", cfg.database_path().display());

    let db = Database::open(cfg.database_path())?;
    let state = AppState::new(db);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
