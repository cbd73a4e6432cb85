//! Slotbook service entry point.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use slotbook::adapters::auth::JwtVerifier;
use slotbook::adapters::email::{ResendConfig, ResendNotifier};
use slotbook::adapters::http::{build_router, AppState};
use slotbook::adapters::postgres::{
    PostgresEventDirectory, PostgresLedgerStore, PostgresPaymentRepository,
    PostgresRegistrationRepository, PostgresUserDirectory,
};
use slotbook::adapters::stripe::{StripeConfig, StripeGateway};
use slotbook::application::handlers::booking::CheckoutUrls;
use slotbook::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "starting slotbook"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let jwt_secret = SecretString::new(config.auth.jwt_secret.clone());
    let state = AppState {
        registrations: Arc::new(PostgresRegistrationRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        ledger: Arc::new(PostgresLedgerStore::new(pool.clone())),
        events: Arc::new(PostgresEventDirectory::new(pool.clone())),
        users: Arc::new(PostgresUserDirectory::new(pool.clone())),
        gateway: Arc::new(StripeGateway::new(StripeConfig::new(
            config.payment.stripe_api_key.clone(),
        ))),
        notifier: Arc::new(ResendNotifier::new(ResendConfig::new(
            config.email.resend_api_key.clone(),
            config.email.from_header(),
        ))),
        token_verifier: Arc::new(JwtVerifier::new(&jwt_secret)),
        webhook_secret: SecretString::new(config.payment.stripe_webhook_secret.clone()),
        jobs_trigger_secret: SecretString::new(config.jobs.trigger_secret.clone()),
        checkout_urls: CheckoutUrls {
            success_url: config.payment.checkout_success_url.clone(),
            cancel_url: config.payment.checkout_cancel_url.clone(),
        },
        payment_timeout_minutes: config.payment.pending_payment_timeout_mins,
    };

    let mut router = build_router(state);

    let cors_origins = config.server.cors_origins_list();
    if !cors_origins.is_empty() {
        let origins: Vec<axum::http::HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        router = router.layer(CorsLayer::new().allow_origin(origins));
    }

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
