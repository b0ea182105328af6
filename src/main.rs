use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use prs_core::{database_path_from_env_value, CoreConfig, Database};

/// Main entry point for the PRS application
///
/// Starts the REST server (port 3000 by default, configurable via
/// PRS_REST_ADDR) over the SQLite patient-records database.
///
/// # Environment Variables
/// - `PRS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PRS_DATABASE_PATH`: SQLite database file (default: "patient_records.db")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("prs_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PRS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = CoreConfig::new(database_path_from_env_value(
        std::env::var("PRS_DATABASE_PATH").ok(),
    ));

    tracing::info!("++ Starting PRS REST on {}", addr);
    tracing::info!("++ Patient records database: {}", cfg.database_path().display());

    let db = Database::open(cfg.database_path())?;
    let rest_app = app(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, rest_app).await?;

    Ok(())
}
