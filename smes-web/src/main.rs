//! smes-web - Student Media Ethics Survey service
//!
//! Single binary serving the questionnaire submission API and the live
//! analytics dashboard over one SQLite store.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use smes_common::api::auth::load_shared_secret;
use smes_common::config;
use smes_common::db::init_database;
use smes_common::events::EventBus;
use smes_common::sse::SseBroadcaster;
use smes_web::store::{load_snapshot, SnapshotHandle, StoreWatcher};
use smes_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "smes-web", about = "Student media ethics survey service")]
struct Args {
    /// Root data folder (overrides SMES_ROOT and the config file)
    #[arg(long)]
    root: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting SMES survey service (smes-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root.as_deref());
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    // Load shared secret for admin API authentication
    let shared_secret = match load_shared_secret(&pool).await {
        Ok(secret) => {
            if secret == 0 {
                info!("Admin API authentication disabled (shared_secret = 0)");
            } else {
                info!("✓ Loaded shared secret for admin API authentication");
            }
            secret
        }
        Err(e) => {
            error!("Failed to load shared secret: {}", e);
            return Err(e.into());
        }
    };

    // Event plumbing: writes notify the bus, the store watcher reloads the
    // snapshot and pushes a refresh to SSE clients.
    let bus = EventBus::new(256);
    let sse = SseBroadcaster::new(100);

    let initial = load_snapshot(&pool).await?;
    info!(
        "Initial snapshot: {} users, {} responses",
        initial.users.len(),
        initial.responses.len()
    );
    let snapshot = SnapshotHandle::new(initial);

    StoreWatcher::spawn(pool.clone(), bus.clone(), sse.clone(), snapshot.clone());

    let state = AppState::new(pool.clone(), shared_secret, bus, sse, snapshot);
    let app = build_router(state);

    let service = config::load_service_config(&pool).await?;
    let addr = format!("{}:{}", service.host, service.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("smes-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
