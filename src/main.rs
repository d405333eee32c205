use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use travel_pricing::bookings::{BookingRepository, InMemoryBookingRepository};
use travel_pricing::cache::AppCache;
use travel_pricing::config::Settings;
use travel_pricing::db::{self, PgBookingRepository};
use travel_pricing::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let repo: Arc<dyn BookingRepository> = match &settings.database_url {
        Some(url) => {
            let pool = db::connect(url, settings.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            let repo = PgBookingRepository::new(pool);
            repo.ensure_schema()
                .await
                .context("Failed to prepare bookings table")?;
            info!("Using Postgres booking repository");
            Arc::new(repo)
        }
        None => {
            info!("No database configured, bookings are kept in memory");
            Arc::new(InMemoryBookingRepository::new())
        }
    };

    let cache = AppCache::with_capacity(settings.cache_capacity);
    let state = AppState::new(repo, settings.policies.clone(), cache);
    let app = build_router(state);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
