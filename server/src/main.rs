use std::{fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use mileage_tracker_data_management::DataManager;
use mileage_tracker_lib::DistanceTable;
use server::{
    auth::{password::Passwords, token::TokenSigner},
    config::Config,
    routes::create_router,
    server_state::ServerState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    std::fs::create_dir_all(&config.log_dir).with_context(|| format!("creating log directory {:?}", config.log_dir))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_dir.join("server.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=debug,mileage_tracker_data_management=debug", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    tracing::info!("Starting server...");

    if config.jwt_secret_generated {
        tracing::warn!("JWT_SECRET not set, using a random secret. Tokens will not survive a restart");
    }

    let distance_table = match &config.distance_table_path {
        Some(path) => DistanceTable::from_path(path)?,
        None => DistanceTable::bundled()?,
    };

    let data_manager = DataManager::start(&config.database_path, distance_table, config.reimbursement_rate).await?;

    let server_state = Arc::new(ServerState {
        data_manager,
        passwords: Passwords::default(),
        tokens: TokenSigner::new(&config.jwt_secret, config.token_ttl)?,
    });

    let app = create_router(server_state).into_make_service_with_connect_info::<SocketAddr>();

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let addr = config.socket_addr();
    match &config.tls {
        Some(tls) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .with_context(|| format!("loading TLS certificate {:?}", tls.cert_path))?;

            tracing::info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, rustls_config).handle(handle).serve(app).await?;
        }
        None => {
            tracing::info!("Listening on http://{}", addr);
            axum_server::bind(addr).handle(handle).serve(app).await?;
        }
    }

    tracing::info!("Server stopped");

    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then lets in-flight requests finish.
async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
