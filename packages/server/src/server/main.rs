// Main entry point for API server

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use events_core::domains::auth::JwtService;
use events_core::domains::notifications::{DispatcherConfig, NotificationDispatcher};
use events_core::kernel::{BaseMailer, LogMailer, ServerDeps, SmtpMailer, StreamHub};
use events_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,events_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting events API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let mailer: Arc<dyn BaseMailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("EMAIL_USER/EMAIL_PASSWORD not set, outgoing mail will only be logged");
            Arc::new(LogMailer)
        }
    };

    let deps = Arc::new(ServerDeps::new(
        pool,
        mailer,
        StreamHub::new(),
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        config.frontend_url.clone(),
    ));

    let dispatcher = NotificationDispatcher::new(
        deps.clone(),
        DispatcherConfig {
            poll_interval: config.notification_poll_interval,
            ..Default::default()
        },
    );
    let dispatcher_shutdown = dispatcher.shutdown_handle();
    let dispatcher_task = tokio::spawn(async move {
        if let Err(e) = dispatcher.run().await {
            tracing::error!(error = %e, "Notification dispatcher exited with error");
        }
    });

    let app = build_app(deps)?;

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped, waiting for notification dispatcher");
    dispatcher_shutdown.store(true, Ordering::SeqCst);
    if let Err(e) = dispatcher_task.await {
        tracing::error!(error = %e, "Notification dispatcher task panicked");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
