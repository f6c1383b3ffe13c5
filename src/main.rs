use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streamcore::application::use_cases::extract_stream::{ExtractStreamUseCase, RetryPolicy};
use streamcore::application::use_cases::resolve_subtitles::ResolveSubtitlesUseCase;
use streamcore::domain::entities::extraction_result::ExtractionResult;
use streamcore::domain::entities::subtitle::SubtitleBlob;
use streamcore::infrastructure::cache::LruTtlCache;
use streamcore::infrastructure::external::extraction::{BrowserExtractionEngine, HttpExtractionEngine};
use streamcore::infrastructure::external::{MetadataClient, SubtitleProviderClient};
use streamcore::infrastructure::proxy::stream_proxy_handler;
use streamcore::infrastructure::stealth::FingerprintPool;
use streamcore::interfaces::external_services::{ExtractionEngine, MetadataService, SubtitleProvider};
use streamcore::presentation::http::handlers::{extract_handlers, health_handlers, subtitle_handlers, tmdb_handlers};
use streamcore::presentation::http::middleware::{cors, logging};

/// Everything read from the environment once at startup. Secrets are
/// never `Debug`-printed or logged; only non-secret fields are logged
/// in `main` below.
struct Config {
    port: u16,
    tmdb_api_key: String,
    subtitle_api_key: String,
    subtitle_provider_base_url: String,
    webdriver_url: String,
    fingerprint_pool_size: usize,
    results_cache_capacity: usize,
    subtitle_cache_capacity: usize,
}

impl Config {
    /// Reads and validates every setting. A missing secret is the only
    /// thing that fails this step; everything else has a sane default.
    fn from_env() -> anyhow::Result<Self> {
        let tmdb_api_key = std::env::var("TMDB_API_KEY")
            .map_err(|_| anyhow::anyhow!("TMDB_API_KEY must be set"))?;
        let subtitle_api_key = std::env::var("SUBTITLE_API_KEY")
            .map_err(|_| anyhow::anyhow!("SUBTITLE_API_KEY must be set"))?;

        Ok(Self {
            port: std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse()?,
            tmdb_api_key,
            subtitle_api_key,
            subtitle_provider_base_url: std::env::var("SUBTITLE_PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://api.subtitle-provider.example/v1".to_string()),
            webdriver_url: std::env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            fingerprint_pool_size: std::env::var("FINGERPRINT_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
            results_cache_capacity: std::env::var("RESULTS_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            subtitle_cache_capacity: std::env::var("SUBTITLE_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
        })
    }
}

/// Handler state. Each field is independently resolvable via `FromRef`
/// so each route only declares the one piece of state it actually uses.
#[derive(Clone)]
struct AppState {
    extract_use_case: Arc<ExtractStreamUseCase>,
    subtitle_use_case: Arc<ResolveSubtitlesUseCase>,
    metadata: Arc<dyn MetadataService>,
    proxy_client: Arc<reqwest::Client>,
}

impl FromRef<AppState> for Arc<ExtractStreamUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.extract_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<ResolveSubtitlesUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.subtitle_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<dyn MetadataService> {
    fn from_ref(state: &AppState) -> Self {
        state.metadata.clone()
    }
}

impl FromRef<AppState> for Arc<reqwest::Client> {
    fn from_ref(state: &AppState) -> Self {
        state.proxy_client.clone()
    }
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let metadata: Arc<dyn MetadataService> = Arc::new(MetadataClient::new(config.tmdb_api_key.as_str())?);

    let subtitle_provider: Arc<dyn SubtitleProvider> = Arc::new(SubtitleProviderClient::new(
        config.subtitle_api_key.as_str(),
        config.subtitle_provider_base_url.as_str(),
    )?);
    let subtitle_blobs: Arc<LruTtlCache<String, SubtitleBlob>> =
        Arc::new(LruTtlCache::new(config.subtitle_cache_capacity, Duration::from_secs(SubtitleBlob::TTL_SECONDS as u64)));
    let subtitle_use_case = Arc::new(ResolveSubtitlesUseCase::new(subtitle_provider, subtitle_blobs));

    let fingerprint_pool = FingerprintPool::new(config.fingerprint_pool_size);

    let engines: Vec<Arc<dyn ExtractionEngine>> = vec![
        Arc::new(HttpExtractionEngine::new()?),
        Arc::new(BrowserExtractionEngine::new(config.webdriver_url.clone())),
    ];
    let results_cache = Arc::new(LruTtlCache::new(
        config.results_cache_capacity,
        Duration::from_secs(ExtractionResult::TTL_SECONDS as u64),
    ));
    let extract_use_case = Arc::new(ExtractStreamUseCase::new(
        engines,
        fingerprint_pool,
        results_cache,
        RetryPolicy::default(),
    ));

    let proxy_client = Arc::new(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?,
    );

    Ok(AppState { extract_use_case, subtitle_use_case, metadata, proxy_client })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handlers::health_check))
        .route("/api/extract-shadowlands", get(extract_handlers::extract_shadowlands))
        .route("/api/stream-proxy", get(stream_proxy_handler).head(stream_proxy_handler))
        .route("/api/subtitles", get(subtitle_handlers::list_subtitles))
        .route("/api/subtitles/download", post(subtitle_handlers::download_subtitle))
        .route("/api/tmdb", get(tmdb_handlers::tmdb_passthrough))
        .layer(axum::middleware::from_fn(logging::logging_middleware))
        .layer(cors::cors_layer())
        .with_state(state)
}

/// Exit codes per the documented CLI contract: 0 normal, 1 configuration
/// error, 2 port bind failure.
fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_max_level(Level::TRACE)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install global tracing subscriber");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("configuration error: {err}");
            return ExitCode::from(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to start async runtime: {err}");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> ExitCode {
    info!(
        port = config.port,
        fingerprint_pool_size = config.fingerprint_pool_size,
        results_cache_capacity = config.results_cache_capacity,
        "starting streamcore"
    );

    let state = match build_state(&config) {
        Ok(state) => state,
        Err(err) => {
            error!("failed to initialize application state: {err}");
            return ExitCode::from(1);
        }
    };

    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, "failed to bind: {err}");
            return ExitCode::from(2);
        }
    };

    info!(%addr, "listening");
    if let Err(err) = axum::serve(listener, app.into_make_service()).await {
        error!("server error: {err}");
        warn!("shutting down");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
