/// Identra server binary
///
/// Startup order: logging, configuration, database pool, migrations, then
/// the HTTP and gRPC servers side by side. A failure in any step before
/// serving is fatal; a failure of either server tears down the process.

use anyhow::Context;
use identra_api::{
    app::{build_router, AppState},
    config::Config,
    grpc::AuthService,
};
use identra_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identra_api=debug,identra_shared=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let http_address = config.http_address();
    let grpc_address = config
        .grpc_address()
        .parse()
        .context("Invalid gRPC address")?;

    let state = AppState::new(pool, config)?;

    let grpc = tonic::transport::Server::builder()
        .add_service(AuthService::new(state.users.clone()).into_server())
        .serve(grpc_address);

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&http_address)
        .await
        .with_context(|| format!("Failed to bind {}", http_address))?;

    info!(%http_address, %grpc_address, "Identra server listening");

    tokio::try_join!(
        async { axum::serve(listener, router).await.context("HTTP server failed") },
        async { grpc.await.context("gRPC server failed") },
    )?;

    Ok(())
}
