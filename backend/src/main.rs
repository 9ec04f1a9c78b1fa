use std::sync::Arc;
use backend::{
    config::AppConfig,
    queries::PgVoterStore,
    routes::{build_rocket, AppState},
    store::{UnconfiguredStore, VoterStore},
};
use shared::CandidateRoster;
use shuttle_runtime::CustomError;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Another subscriber may already be installed by the runtime.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn connect_store(database_url: &str, max_connections: u32) -> Result<PgVoterStore, Box<dyn std::error::Error + Send + Sync>> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("📋 Migrations complete");

    Ok(PgVoterStore::connect(pool).await?)
}

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    init_tracing();
    info!("🗳️ Starting ballot box server");

    let config = AppConfig::from_lookup(|key| secret_store.get(key)).map_err(CustomError::new)?;

    let store: Arc<dyn VoterStore> = match &config.database_url {
        Some(url) => match connect_store(url, config.max_connections).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Database unavailable, serving empty read-only views: {}", e);
                Arc::new(UnconfiguredStore)
            }
        },
        None => {
            warn!("DATABASE_URL not found - serving empty read-only views");
            Arc::new(UnconfiguredStore)
        }
    };

    let mut state = AppState::new(store, CandidateRoster::default(), config.tally_fallback);
    state.load().await;

    Ok(build_rocket(state).into())
}
