//! Person Rating server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

use person_rating::adapters::http::api_router;
use person_rating::adapters::redis::{
    EventConsumerConfig, RedisEventConsumer, RedisJobLock, RedisPersonCache, RedisSnapshotStore,
};
use person_rating::adapters::{
    FileSnapshotStore, HttpOrderClient, OrderClientConfig, PostgresPersonRepository,
};
use person_rating::application::{
    AggregatorConfig, PersonService, RatingAggregator, RatingUpdatedHandler, RefreshScheduler,
    SchedulerConfig, SnapshotCache,
};
use person_rating::config::{AppConfig, ServerConfig, SnapshotBackend};
use person_rating::ports::SnapshotStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server)?;
    tracing::info!(environment = ?config.server.environment, "Starting person rating service");

    // Authoritative store.
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        PostgresPersonRepository::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Cache, lock and shared snapshot use one multiplexed connection.
    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = tokio::time::timeout(
        config.redis.timeout(),
        redis_client.get_multiplexed_async_connection(),
    )
    .await??;

    let repository = Arc::new(PostgresPersonRepository::new(pool.clone()));
    let cache = Arc::new(
        RedisPersonCache::new(redis_conn.clone(), config.cache.ttl())
            .with_key_prefix(config.cache.key_prefix.clone()),
    );
    let lock = Arc::new(
        RedisJobLock::new(redis_conn.clone()).with_key_prefix(config.cache.key_prefix.clone()),
    );
    let snapshot_store: Arc<dyn SnapshotStore> = match config.snapshot.backend {
        SnapshotBackend::Redis => Arc::new(
            RedisSnapshotStore::new(redis_conn).with_key_prefix(config.cache.key_prefix.clone()),
        ),
        SnapshotBackend::File => Arc::new(FileSnapshotStore::new(&config.snapshot.path)),
    };

    let orders = Arc::new(HttpOrderClient::new(
        OrderClientConfig::new(config.rating_source.base_url.clone())
            .with_timeout(config.rating_source.request_timeout()),
    )?);
    let aggregator = Arc::new(RatingAggregator::new(
        orders,
        AggregatorConfig::default()
            .with_request_timeout(config.rating_source.request_timeout())
            .with_max_concurrency(config.rating_source.max_concurrency),
    ));
    let snapshots = Arc::new(
        SnapshotCache::new(snapshot_store).with_max_age(config.snapshot.max_age()),
    );

    let service = Arc::new(PersonService::new(repository, cache, aggregator, snapshots));

    // Scheduled and event-driven refreshes share one lock-guarded scheduler.
    let scheduler = Arc::new(RefreshScheduler::new(
        lock,
        service.clone(),
        SchedulerConfig::default()
            .with_job_name(config.scheduler.job_name.clone())
            .with_interval(config.scheduler.interval())
            .with_lock_ttl(config.scheduler.lock_ttl()),
    ));

    // Background tasks stop when this flips to true.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background = tokio::task::JoinSet::new();

    if config.scheduler.enabled {
        let scheduler = scheduler.clone();
        let shutdown = shutdown_rx.clone();
        background.spawn(async move { scheduler.run(shutdown).await });
    }

    if config.events.enabled {
        let consumer = RedisEventConsumer::new(
            redis_client,
            Arc::new(RatingUpdatedHandler::new(service.clone(), scheduler)),
            EventConsumerConfig::new(config.events.topic.clone()),
        );
        let shutdown = shutdown_rx.clone();
        background.spawn(async move { consumer.run(shutdown).await });
    }

    let app = api_router(service, config.server.request_timeout());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopping background tasks");
    let _ = shutdown_tx.send(true);
    while let Some(result) = background.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Background task ended abnormally");
        }
    }
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Installs the global subscriber; `RUST_LOG` overrides the configured level.
fn init_tracing(server: &ServerConfig) -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))?;

    let fmt_layer = if server.is_production() {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().compact().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
