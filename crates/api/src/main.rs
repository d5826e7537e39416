use std::net::SocketAddr;
use std::sync::Arc;

use blendfarm_core::accounts::current_accounts;
use blendfarm_core::project::ProjectStore;
use blendfarm_core::scheduler::slurm::SlurmScheduler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blendfarm_api::config::ServerConfig;
use blendfarm_api::flash::FlashSlot;
use blendfarm_api::router::build_app_router;
use blendfarm_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        projects_root = %config.projects_root.display(),
        cluster = %config.slurm.cluster,
        "Loaded server configuration"
    );

    // --- Project store ---
    let projects = ProjectStore::new(&config.projects_root);
    projects
        .ensure_layout()
        .expect("Failed to create projects directory");

    // --- Accounts ---
    let accounts = current_accounts().await;
    tracing::info!(?accounts, "Resolved project accounts");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        projects,
        scheduler: Arc::new(SlurmScheduler::new(config.slurm.clone())),
        flash: Arc::new(FlashSlot::default()),
        accounts: Arc::new(accounts),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "blendfarm_api=debug,blendfarm_core=debug,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
