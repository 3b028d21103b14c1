use std::sync::Arc;

use driverelay_api::{build_router, state::AppState};
use driverelay_config::Settings;
use driverelay_services::StorageProvider;
use driverelay_services::cloud_storage::google_drive::GoogleDriveService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "driverelay_api=debug,driverelay_services=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!(
        "Starting Drive relay on {}:{}",
        settings.app.host, settings.app.port
    );
    info!(
        credentials_path = %settings.drive.credentials_path,
        token_path = %settings.drive.token_path,
        source_path = %settings.drive.source_path,
        "Drive config"
    );

    // Build app state
    let storage: Arc<dyn StorageProvider> =
        Arc::new(GoogleDriveService::new(settings.drive.scope.clone()));
    let app_state = AppState::new(settings.clone(), storage);

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
