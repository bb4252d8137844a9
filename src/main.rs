use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{error, info};

use devcamper::logging::init_tracing;
use devcamper::metrics::init_metrics;
use devcamper::router::init_router;
use devcamper::state::init_app_state;
use devcamper_db::run_migrations;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&state.db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    init_metrics(state.app_config.observability_enabled);

    let addr = SocketAddr::from(([0, 0, 0, 0], state.app_config.port));
    let environment = state.app_config.environment;
    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        %addr,
        environment = environment.as_str(),
        "Server running, docs at /swagger-ui and /scalar"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
