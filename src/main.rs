use actix_web::{web, App, HttpServer};
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod auth;
mod config;
mod domain;
mod messaging;
mod metrics;
mod models;
mod store;
mod utils;

use api::AppState;
use auth::{Authenticator, TokenService};
use config::{Cli, Command, Settings};
use domain::company::CompanyCommandHandler;
use messaging::KafkaEventPublisher;
use store::{PgCompanyRepository, PgUserRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Default to INFO, overridable with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,company_service=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.subcommand() {
        Command::Serve => serve(cli.settings).await,
        Command::TailEvents => {
            let s = &cli.settings;
            messaging::tail_events(&s.kafka_url, &s.kafka_group_id, &s.kafka_topic).await
        }
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!("🚀 Starting company service");

    if settings.jwt_secret == "secretTest" {
        tracing::warn!("JWT_SECRET is the development default; set it before exposing the API");
    }

    // === 1. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 2. Postgres ===
    let pool = store::connect(&settings).await?;
    store::ensure_schema(&pool).await?;
    tracing::info!(host = %settings.db_host, database = %settings.db_name, "Connected to Postgres");

    let companies = Arc::new(PgCompanyRepository::new(pool.clone()));
    let users = Arc::new(PgUserRepository::new(pool.clone()));

    // === 3. Default administrative account ===
    auth::ensure_default_user(users.as_ref(), &settings.api_user, &settings.api_password).await?;

    // === 4. Kafka publisher (circuit breaker + tracked deliveries) ===
    let publisher = Arc::new(KafkaEventPublisher::new(
        &settings.kafka_url,
        &settings.kafka_topic,
        metrics.clone(),
    )?);
    tracing::info!(brokers = %settings.kafka_url, topic = %settings.kafka_topic, "Event publisher ready");

    let state = web::Data::new(AppState {
        commands: CompanyCommandHandler::new(companies, publisher.clone(), metrics.clone()),
        auth: Authenticator::new(users, TokenService::new(&settings.jwt_secret), metrics.clone())?,
        cookie_secure: settings.cookie_secure,
    });

    // === 5. Metrics server ===
    let metrics_server = metrics::metrics_server(metrics.registry().clone(), settings.metrics_port)?;
    let metrics_handle = metrics_server.handle();
    actix_web::rt::spawn(async move {
        if let Err(e) = metrics_server.await {
            tracing::error!(error = %e, "Metrics server error");
        }
    });

    // === 6. API server; returns after SIGINT/SIGTERM and the grace period ===
    tracing::info!(port = settings.api_port, "🌐 API listening on http://0.0.0.0:{}/api", settings.api_port);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(("0.0.0.0", settings.api_port))?
        .shutdown_timeout(settings.shutdown_grace_secs)
        .run()
        .await?;

    // === 7. Shutdown ===
    tracing::info!("HTTP server stopped; shutting down");
    metrics_handle.stop(true).await;
    publisher.close(settings.publish_drain()).await;
    pool.close().await;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
