use std::sync::Arc;

use auth_service::config::Config;
use auth_service::config::StorageBackend;
use auth_service::domain::identity::ports::IdentityRepository;
use auth_service::domain::identity::service::AuthenticationService;
use auth_service::domain::identity::verifier::StoreCredentialVerifier;
use auth_service::inbound::http::middleware::AuthenticationPipeline;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::outbound::repositories::InMemoryIdentityRepository;
use auth_service::outbound::repositories::PostgresIdentityRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        backend = ?config.database.backend,
        jwt_expiration_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    let identity_repository: Arc<dyn IdentityRepository> = match config.database.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("database.url is required"))?;

            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(PostgresIdentityRepository::new(pg_pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory identity store; data is lost on exit");
            Arc::new(InMemoryIdentityRepository::new())
        }
    };

    let password_hasher = Arc::new(auth::PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?);
    let token_codec = Arc::new(auth::TokenCodec::new(
        config.jwt.secret.as_bytes(),
        chrono::Duration::hours(config.jwt.expiration_hours),
    ));

    let credential_verifier = Arc::new(StoreCredentialVerifier::new(
        Arc::clone(&identity_repository),
        Arc::clone(&password_hasher),
    ));
    let auth_service = Arc::new(AuthenticationService::new(
        Arc::clone(&identity_repository),
        credential_verifier,
        password_hasher,
        Arc::clone(&token_codec),
    ));
    let pipeline = Arc::new(AuthenticationPipeline::new(
        token_codec,
        identity_repository,
    ));

    let http_address = config.http_address();
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(AppState {
        auth_service,
        pipeline,
    });

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
