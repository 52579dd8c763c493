pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod recipes;
pub mod server;

pub use cache::{CacheBackend, CachedEntry, ListingCache};
pub use config::{
    AppConfig, CacheConfig, ConfigError, PostgresStorageConfig, RedisConfig, ServerConfig,
    StorageBackend, load_config,
};
pub use observability::{init_tracing, init_tracing_with_level};
pub use recipes::RecipeService;
pub use server::{AppState, LadleServer, ServerBuilder, build_app};

/// Create a cache backend based on configuration.
///
/// ## Cache Modes
///
/// - **Redis disabled**: Returns local-only cache (DashMap)
/// - **Redis enabled**: Attempts to connect to Redis, falls back to local on failure
///
/// ## Graceful Degradation
///
/// If Redis connection fails, the system automatically falls back to local-only mode.
/// This allows the server to start and run even if Redis is unavailable.
pub async fn create_cache_backend(config: &RedisConfig) -> CacheBackend {
    use std::time::Duration;

    if !config.enabled {
        tracing::info!("Redis disabled, using local cache only");
        return CacheBackend::new_local();
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let mut pool_config = redis_config.pool.take().unwrap_or_default();
    pool_config.max_size = config.pool_size;
    pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to local cache."
            );
            return CacheBackend::new_local();
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            CacheBackend::new_redis(pool)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to local cache."
            );
            CacheBackend::new_local()
        }
    }
}
