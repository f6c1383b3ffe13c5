//! Extract Stream Use Case
//!
//! The public entry point for acquiring a playable stream for a
//! `CatalogRef`: checks the result cache, deduplicates concurrent
//! requests for the same key, drives the extraction engines with
//! retry/backoff and server fallback, and caches a successful result.
//!
//! Direct analogue of `StreamMediaUseCase`'s shape (a use case struct
//! holding `Arc<dyn Trait>` ports plus concrete infra behind `Arc`,
//! exposing one async entry point) generalized from a local-file
//! streaming workflow to the cached, retried, multi-attempt extraction
//! workflow this crate implements instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::entities::extraction_result::{ChainSummary, ExtractionResult, StreamType};
use crate::domain::entities::extraction_session::{ExtractionMode, IframeKind, IframeStep};
use crate::domain::value_objects::error_kind::ErrorKind;
use crate::domain::value_objects::CatalogRef;
use crate::infrastructure::cache::lru_ttl_cache::LruTtlCache;
use crate::infrastructure::progress::{ProgressEvent, ProgressSender};
use crate::infrastructure::stealth::fingerprint_pool::FingerprintPool;
use crate::interfaces::external_services::extraction_engine::{ExtractionEngine, ExtractionRequest};

/// Declarative retry policy consulted by the controller. Data, not
/// code, per the redesign converting ad-hoc `AbortController` +
/// `setTimeout` retry logic into a struct the controller reads.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_ms: Vec<u64>,
    pub rate_limit_delay_ms: u64,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: vec![2_000, 5_000, 10_000],
            rate_limit_delay_ms: 60_000,
            attempt_timeout: Duration::from_secs(45),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `next_attempt` (2-indexed: attempt 2 uses
    /// index 0), given the `ErrorKind` the previous attempt failed with.
    fn delay_for(&self, next_attempt: u32, kind: ErrorKind) -> Duration {
        if let Some(fixed) = kind.fixed_retry_delay_ms() {
            return Duration::from_millis(fixed);
        }
        let index = next_attempt.saturating_sub(2) as usize;
        let millis = self
            .backoff_ms
            .get(index)
            .copied()
            .unwrap_or_else(|| self.backoff_ms.last().copied().unwrap_or(self.rate_limit_delay_ms));
        Duration::from_millis(millis)
    }
}

/// The preferred server plus any per-request overrides the client may supply.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub preferred_server: String,
    pub force_proxy: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { preferred_server: "shadowlands".to_string(), force_proxy: false }
    }
}

type CacheKey = String;
type ResultsCache = LruTtlCache<CacheKey, ExtractionResult>;
type SharedExtraction = Shared<BoxFuture<'static, Result<ExtractionResult, ErrorKind>>>;

fn cache_key(catalog_ref: &CatalogRef, server: &str) -> CacheKey {
    format!("{catalog_ref}|{server}")
}

/// Servers tried in order; the controller falls back to the next one
/// only on the final retry of a retryable failure.
fn fallback_server(server: &str) -> &'static str {
    match server {
        "shadowlands" | "vidsrc" | "vidsrc.xyz" => "embed.su",
        _ => "vidsrc.xyz",
    }
}

fn vidsrc_embed_url(catalog_ref: &CatalogRef) -> String {
    match catalog_ref {
        CatalogRef::Movie { tmdb_id } => format!("https://vidsrc.xyz/embed/movie/{tmdb_id}"),
        CatalogRef::Episode { tmdb_id, season, episode } => {
            format!("https://vidsrc.xyz/embed/tv/{tmdb_id}/{season}-{episode}")
        }
    }
}

/// Orchestrates one extraction request end to end: cache, debounce,
/// retry/backoff, server fallback, fingerprint lifecycle. Cheap to
/// clone — every field is already `Arc`-backed or small `Copy`/owned
/// data, so handlers can hold a plain `ExtractStreamUseCase` in
/// `AppState` without wrapping it in another `Arc`.
#[derive(Clone)]
pub struct ExtractStreamUseCase {
    engines: Arc<HashMap<ExtractionMode, Arc<dyn ExtractionEngine>>>,
    fingerprint_pool: Arc<FingerprintPool>,
    results_cache: Arc<ResultsCache>,
    in_flight: Arc<Mutex<HashMap<CacheKey, SharedExtraction>>>,
    retry_policy: RetryPolicy,
}

impl ExtractStreamUseCase {
    pub fn new(
        engines: Vec<Arc<dyn ExtractionEngine>>,
        fingerprint_pool: Arc<FingerprintPool>,
        results_cache: Arc<ResultsCache>,
        retry_policy: RetryPolicy,
    ) -> Self {
        let engines = Arc::new(engines.into_iter().map(|e| (e.mode(), e)).collect());
        Self {
            engines,
            fingerprint_pool,
            results_cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            retry_policy,
        }
    }

    /// Acquires (or waits on an in-flight copy of) the extraction result
    /// for `catalog_ref`. Never returns an `Err` variant other than a
    /// classified `ErrorKind`; callers never see partial results.
    pub async fn extract(
        &self,
        catalog_ref: CatalogRef,
        options: ClientOptions,
        progress: ProgressSender,
    ) -> Result<ExtractionResult, ErrorKind> {
        let key = cache_key(&catalog_ref, &options.preferred_server);

        if let Some(cached) = self.results_cache.get(&key).await {
            if !cached.is_expired() {
                debug!(cache_key = %key, "extraction cache hit");
                return Ok(cached);
            }
        }

        // Debounce: a second caller arriving while the first is still
        // in flight subscribes to the same shared future instead of
        // starting a redundant extraction.
        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(existing) = in_flight.get(&key) {
                existing.clone()
            } else {
                let state = Attempt {
                    engines: Arc::clone(&self.engines),
                    fingerprint_pool: Arc::clone(&self.fingerprint_pool),
                    results_cache: Arc::clone(&self.results_cache),
                    retry_policy: self.retry_policy.clone(),
                };
                let fut = run_extraction(state, key.clone(), catalog_ref, options, progress).boxed().shared();
                in_flight.insert(key.clone(), fut.clone());
                fut
            }
        };

        let result = shared.await;

        let mut in_flight = self.in_flight.lock().await;
        if let Some(entry) = in_flight.get(&key) {
            if entry.peek().is_some() {
                in_flight.remove(&key);
            }
        }
        drop(in_flight);

        result
    }
}

/// Owned, 'static-safe bundle of everything one extraction attempt
/// needs, so the debounce map's shared future doesn't borrow from the
/// use case that spawned it.
struct Attempt {
    engines: Arc<HashMap<ExtractionMode, Arc<dyn ExtractionEngine>>>,
    fingerprint_pool: Arc<FingerprintPool>,
    results_cache: Arc<ResultsCache>,
    retry_policy: RetryPolicy,
}

async fn run_extraction(
    state: Attempt,
    key: CacheKey,
    catalog_ref: CatalogRef,
    options: ClientOptions,
    progress: ProgressSender,
) -> Result<ExtractionResult, ErrorKind> {
    let guard = match timeout(Duration::from_secs(5), state.fingerprint_pool.acquire()).await {
        Ok(guard) => guard,
        Err(_) => return Err(ErrorKind::NoFingerprintAvailable),
    };

    let mut server = options.preferred_server.clone();
    let mut mode = ExtractionMode::Http;
    let mut last_kind = ErrorKind::NetworkError;

    for attempt in 1..=state.retry_policy.max_retries + 1 {
        let session_id = uuid::Uuid::new_v4();
        progress
            .send(ProgressEvent::for_stage(
                session_id,
                crate::domain::value_objects::extraction_stage::ExtractionStage::Connecting,
            ))
            .await;

        let request = ExtractionRequest {
            vidsrc_url: vidsrc_embed_url(&catalog_ref),
            server: server.clone(),
            stealth: guard.context().clone(),
        };

        let Some(engine) = state.engines.get(&mode) else {
            return Err(ErrorKind::NoStreamUrlFound);
        };

        let outcome = match timeout(state.retry_policy.attempt_timeout, engine.extract(request)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                last_kind = err.kind();
                if !last_kind.retryable() || attempt > state.retry_policy.max_retries {
                    warn!(?last_kind, attempt, "extraction failed");
                    return Err(last_kind);
                }
                retry_and_continue(&state, &mut server, &mut mode, attempt, last_kind).await;
                continue;
            }
            Err(_) => {
                last_kind = ErrorKind::NetworkError;
                if attempt > state.retry_policy.max_retries {
                    return Err(last_kind);
                }
                retry_and_continue(&state, &mut server, &mut mode, attempt, last_kind).await;
                continue;
            }
        };

        let chain = chain_summary(&outcome.steps, &vidsrc_embed_url(&catalog_ref));
        let stream_type = if outcome.final_url.contains(".m3u8") { StreamType::Hls } else { StreamType::Direct };

        let result = ExtractionResult::new(
            catalog_ref,
            outcome.final_url,
            stream_type,
            outcome.requires_proxy || options.force_proxy,
            outcome.proxy_source,
            server.clone(),
            mode,
            chain,
        );

        state.results_cache.put(key, result.clone()).await;
        info!(server = %server, ?mode, attempt, "extraction succeeded");
        return Ok(result);
    }

    Err(last_kind)
}

/// Applies backoff, mode alternation, and (on the final retry only)
/// server fallback before the next attempt.
async fn retry_and_continue(
    state: &Attempt,
    server: &mut String,
    mode: &mut ExtractionMode,
    attempt: u32,
    kind: ErrorKind,
) {
    let delay = state.retry_policy.delay_for(attempt + 1, kind);
    info!(?kind, attempt, delay_ms = delay.as_millis() as u64, "retrying extraction");

    if attempt == state.retry_policy.max_retries {
        *server = fallback_server(server).to_string();
    }
    *mode = mode.alternate();
    tokio::time::sleep(delay).await;
}

/// Summarizes the per-step chain into the diagnostic URLs the client
/// response surfaces, keyed by iframe kind.
fn chain_summary(steps: &[IframeStep], vidsrc_url: &str) -> ChainSummary {
    let mut summary = ChainSummary { vidsrc: Some(vidsrc_url.to_string()), ..Default::default() };
    for step in steps {
        match step.kind {
            IframeKind::Vidsrc => summary.vidsrc = Some(step.url.clone()),
            IframeKind::Rcp => summary.cloudnestra = Some(step.url.clone()),
            IframeKind::ProRcp => summary.prorcp = Some(step.url.clone()),
            IframeKind::Shadowlands => summary.shadowlands = Some(step.url.clone()),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::extraction_session::StepOutcome;
    use crate::interfaces::external_services::extraction_engine::ExtractionOutcome;
    use crate::shared::error::ExtractionError;
    use async_trait::async_trait;

    struct StubEngine {
        mode: ExtractionMode,
        responses: Mutex<Vec<Result<ExtractionOutcome, ExtractionError>>>,
    }

    #[async_trait]
    impl ExtractionEngine for StubEngine {
        fn mode(&self) -> ExtractionMode {
            self.mode
        }

        async fn extract(&self, _request: ExtractionRequest) -> Result<ExtractionOutcome, ExtractionError> {
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                return Err(ExtractionError::NoStreamUrlFound);
            }
            responses.remove(0)
        }
    }

    fn sample_outcome() -> ExtractionOutcome {
        ExtractionOutcome {
            final_url: "https://shadowlandschronicles.com/stream/abc.m3u8".to_string(),
            requires_proxy: true,
            proxy_source: Some("shadowlands".to_string()),
            steps: vec![IframeStep {
                index: 0,
                kind: IframeKind::Shadowlands,
                url: "https://shadowlandschronicles.com/stream/abc.m3u8".to_string(),
                outcome: StepOutcome::Ok,
                duration_ms: 10,
            }],
        }
    }

    fn use_case_with(
        http_responses: Vec<Result<ExtractionOutcome, ExtractionError>>,
        browser_responses: Vec<Result<ExtractionOutcome, ExtractionError>>,
    ) -> ExtractStreamUseCase {
        let http_engine: Arc<dyn ExtractionEngine> =
            Arc::new(StubEngine { mode: ExtractionMode::Http, responses: Mutex::new(http_responses) });
        let browser_engine: Arc<dyn ExtractionEngine> =
            Arc::new(StubEngine { mode: ExtractionMode::Browser, responses: Mutex::new(browser_responses) });
        ExtractStreamUseCase::new(
            vec![http_engine, browser_engine],
            FingerprintPool::new(4),
            Arc::new(LruTtlCache::new(10, Duration::from_secs(300))),
            RetryPolicy { backoff_ms: vec![1, 1, 1], rate_limit_delay_ms: 1, ..RetryPolicy::default() },
        )
    }

    #[tokio::test]
    async fn successful_extraction_is_cached_and_not_repeated() {
        let use_case = use_case_with(vec![Ok(sample_outcome())], vec![]);
        let (tx, _rx) = crate::infrastructure::progress::progress_channel();

        let first = use_case.extract(CatalogRef::movie(550).unwrap(), ClientOptions::default(), tx.clone()).await.unwrap();
        assert!(first.requires_proxy);

        let second = use_case.extract(CatalogRef::movie(550).unwrap(), ClientOptions::default(), tx).await.unwrap();
        assert_eq!(first.final_url, second.final_url);
    }

    #[tokio::test]
    async fn non_retryable_failure_stops_after_one_attempt() {
        let use_case = use_case_with(vec![Err(ExtractionError::NotFound)], vec![]);
        let (tx, _rx) = crate::infrastructure::progress::progress_channel();

        let result = use_case.extract(CatalogRef::movie(9999).unwrap(), ClientOptions::default(), tx).await;
        assert_eq!(result.unwrap_err(), ErrorKind::UpstreamNotFound);
    }

    #[tokio::test]
    async fn retryable_failure_alternates_mode_before_succeeding() {
        let use_case = use_case_with(
            vec![Err(ExtractionError::StructureChanged("loadingRcp".to_string()))],
            vec![Ok(sample_outcome())],
        );
        let (tx, _rx) = crate::infrastructure::progress::progress_channel();

        let result = use_case.extract(CatalogRef::movie(551).unwrap(), ClientOptions::default(), tx).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().extraction_method, ExtractionMode::Browser);
    }

    #[tokio::test]
    async fn concurrent_callers_for_the_same_key_share_one_extraction() {
        let use_case = Arc::new(use_case_with(vec![Ok(sample_outcome())], vec![]));
        let (tx, _rx) = crate::infrastructure::progress::progress_channel();

        let a = {
            let use_case = Arc::clone(&use_case);
            let tx = tx.clone();
            tokio::spawn(async move { use_case.extract(CatalogRef::movie(552).unwrap(), ClientOptions::default(), tx).await })
        };
        let b = {
            let use_case = Arc::clone(&use_case);
            tokio::spawn(async move { use_case.extract(CatalogRef::movie(552).unwrap(), ClientOptions::default(), tx).await })
        };

        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra.unwrap().unwrap().final_url, rb.unwrap().unwrap().final_url);
    }
}
