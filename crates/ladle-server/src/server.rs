use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get, routing::post};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ladle_auth::{AuthState, DynCredentialStorage, MemoryCredentialStorage, TokenService};
use ladle_db_memory::InMemoryStorage;
use ladle_db_postgres::{PostgresCredentialStorage, PostgresStorage};
use ladle_storage::DynRecipeStore;

use crate::cache::ListingCache;
use crate::config::{AppConfig, StorageBackend};
use crate::recipes::RecipeService;
use crate::{bootstrap, create_cache_backend, handlers, middleware as app_middleware};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<RecipeService>,
    pub tokens: Arc<TokenService>,
}

/// Builds the full application router from configuration: storage and
/// credential backends, cache, token authority, routes, and middleware.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let (store, credentials): (DynRecipeStore, DynCredentialStorage) = match cfg.storage.backend {
        StorageBackend::Memory => (
            Arc::new(InMemoryStorage::new()),
            Arc::new(MemoryCredentialStorage::new()),
        ),
        StorageBackend::Postgres => {
            let pg = cfg
                .storage
                .postgres
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("storage.postgres config is required"))?;
            let pool = ladle_db_postgres::connect(&pg.url, pg.pool_size).await?;
            ladle_db_postgres::ensure_schema(&pool).await?;
            (
                Arc::new(PostgresStorage::new(pool.clone())),
                Arc::new(PostgresCredentialStorage::new(pool)),
            )
        }
    };
    tracing::info!(backend = store.backend_name(), "storage initialized");

    bootstrap::seed_credentials(credentials.as_ref(), &cfg.bootstrap.users).await?;
    bootstrap::seed_recipes(store.as_ref(), cfg.storage.seed_file.as_deref()).await?;

    let cache_backend = create_cache_backend(&cfg.redis).await;
    let listing = ListingCache::new(cache_backend, cfg.cache.listing_ttl);

    let tokens = Arc::new(TokenService::new(&cfg.auth, credentials)?);
    let recipes = Arc::new(RecipeService::new(store, listing));

    let state = AppState {
        recipes,
        tokens: tokens.clone(),
    };
    let auth_state = AuthState::new(tokens);

    Ok(build_router(state, auth_state, cfg.server.body_limit_bytes))
}

fn build_router(state: AppState, auth_state: AuthState, body_limit: usize) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        // Auth endpoints
        .route("/signin", post(handlers::signin))
        .route("/refresh", post(handlers::refresh))
        // Recipes: reads are public, writes pass the auth gate
        .route(
            "/recipes",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route("/recipes/search", get(handlers::search_recipes))
        .route(
            "/recipes/{id}",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        // Middleware stack (order: auth gate -> request id -> cors/trace -> body limit)
        .layer(middleware::from_fn_with_state(
            auth_state,
            app_middleware::authentication_middleware,
        ))
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<LadleServer> {
        let app = build_app(&self.config).await?;

        Ok(LadleServer {
            addr: self.addr,
            app,
        })
    }
}

pub struct LadleServer {
    addr: SocketAddr,
    app: Router,
}

impl LadleServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
