use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use preop_core::config::persist_attempts_from_env_value;
use preop_core::{CoreConfig, DEFAULT_PATIENT_DATA_DIR, Session};

/// Main entry point for the Preop application
///
/// Loads the patient list from disk and serves the REST API.
///
/// # Environment Variables
/// - `PREOP_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `PREOP_PERSIST_ATTEMPTS`: Snapshot write attempts before a submission fails (default: 3)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("preop=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let patient_data_dir =
        std::env::var("PATIENT_DATA_DIR").unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into());
    let persist_attempts =
        persist_attempts_from_env_value(std::env::var("PREOP_PERSIST_ATTEMPTS").ok())?;
    let cfg = Arc::new(CoreConfig::new(
        PathBuf::from(patient_data_dir),
        persist_attempts,
    )?);

    let rest_addr = std::env::var("PREOP_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let session = Session::open(cfg)?;
    let app = router(AppState::new(session));

    tracing::info!("++ Starting Preop REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
