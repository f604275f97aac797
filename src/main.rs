mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, CounterStoreKind};
use crate::core::{database, middleware};
use crate::features::auth::dtos::DevCredentialsDto;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::{AuthService, JwtService};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::employment::{routes as employment_routes, EmploymentService};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::news::{routes as news_routes, NewsService};
use crate::features::rate_limits::{rate_limit_middleware, RateLimitPolicy, RateLimiter};
use crate::features::talents::{routes as talents_routes, TalentService};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::counter_store::{CounterStore, MemoryCounterStore, RedisCounterStore};
use crate::modules::storage::{LocalStorage, UPLOADS_ROUTE};
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired in-memory counters are swept
const COUNTER_PURGE_INTERVAL: Duration = Duration::from_secs(60);

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}, environment={}",
        worker_threads,
        std::process::id(),
        config.app.environment
    );

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Users, and the seeded admin account
    let user_service = Arc::new(UserService::new(pool.clone()));
    if user_service
        .seed_admin(&config.admin)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed admin account: {}", e))?
    {
        tracing::warn!(
            "Admin account '{}' created with the configured default password",
            config.admin.username
        );
    }

    // Initialize auth
    let jwt_service =
        Arc::new(JwtService::new(&config.auth).map_err(|e| anyhow::anyhow!(e.to_string()))?);
    let dev_credentials = config.app.is_development().then(|| DevCredentialsDto {
        email: config.admin.email.clone(),
        password: config.admin.password.clone(),
    });
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_service),
        Arc::clone(&jwt_service),
        dev_credentials,
    ));
    tracing::info!("Auth service initialized");

    // Local file storage
    let storage = Arc::new(LocalStorage::from_config(&config.storage));
    storage
        .ensure_root()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare upload directory: {}", e))?;
    tracing::info!("File storage ready at {}", storage.root().display());

    // Content services
    let file_service = Arc::new(FileService::new(pool.clone(), Arc::clone(&storage)));
    let category_service = Arc::new(CategoryService::new(pool.clone()));
    let news_service = Arc::new(NewsService::new(pool.clone(), Arc::clone(&file_service)));
    let talent_service = Arc::new(TalentService::new(pool.clone(), Arc::clone(&file_service)));
    let employment_service = Arc::new(EmploymentService::new(
        pool.clone(),
        Arc::clone(&file_service),
    ));
    tracing::info!("Content services initialized");

    // Rate limit counter store
    let counter_store: Arc<dyn CounterStore> = match config.rate_limit.store {
        CounterStoreKind::Redis => {
            let store = RedisCounterStore::connect(&config.rate_limit.redis)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;
            tracing::info!(
                "Rate limit counters stored in Redis at {}:{}",
                config.rate_limit.redis.host,
                config.rate_limit.redis.port
            );
            Arc::new(store)
        }
        CounterStoreKind::Memory => {
            let store = Arc::new(MemoryCounterStore::new());
            let sweeper = Arc::clone(&store);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(COUNTER_PURGE_INTERVAL);
                loop {
                    interval.tick().await;
                    let purged = sweeper.purge_expired().await;
                    if purged > 0 {
                        tracing::debug!("Purged {} expired rate limit counters", purged);
                    }
                }
            });
            tracing::warn!("Rate limit counters kept in memory; limits are per instance");
            store
        }
    };

    let api_limiter = Arc::new(RateLimiter::from_config(
        RateLimitPolicy::api(&config.rate_limit),
        Arc::clone(&counter_store),
        &config.rate_limit,
    ));
    let login_limiter = Arc::new(RateLimiter::from_config(
        RateLimitPolicy::login(&config.rate_limit),
        Arc::clone(&counter_store),
        &config.rate_limit,
    ));
    tracing::info!(
        "Rate limits: api {}/{:?}, login {}/{:?}, store failure mode {:?}",
        config.rate_limit.api_max,
        config.rate_limit.api_window,
        config.rate_limit.login_max,
        config.rate_limit.login_window,
        config.rate_limit.failure_mode
    );

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(users_routes::routes(Arc::clone(&user_service)))
        .merge(categories_routes::protected_routes(Arc::clone(
            &category_service,
        )))
        .merge(files_routes(Arc::clone(&file_service)))
        .merge(news_routes::protected_routes(Arc::clone(&news_service)))
        .merge(talents_routes::protected_routes(Arc::clone(&talent_service)))
        .merge(employment_routes::protected_routes(Arc::clone(
            &employment_service,
        )))
        .route_layer(from_fn_with_state(
            Arc::clone(&jwt_service),
            middleware::auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service, login_limiter))
        .merge(categories_routes::public_routes(category_service))
        .merge(news_routes::public_routes(news_service))
        .merge(talents_routes::public_routes(talent_service))
        .merge(employment_routes::public_routes(employment_service));

    // Every /api request counts against the general limit
    let api_routes = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn_with_state(api_limiter, rate_limit_middleware));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(api_routes)
        .merge(health_route)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(storage.root()))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(60))
            .with_interval(Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);

    // ConnectInfo feeds the peer address to the rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(middleware::shutdown_signal())
    .await?;

    counter_store.close().await;
    tracing::info!("Server stopped");

    Ok(())
}
