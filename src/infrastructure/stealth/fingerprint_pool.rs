//! Stealth fingerprint pool.
//!
//! Generalizes `infrastructure::gpu::coordinator::GpuCoordinator`'s
//! semaphore-gated exclusive-access pattern: instead of a single shared
//! resource that the semaphore merely throttles access to, this pool
//! holds a fixed `Vec` of pre-generated `StealthFingerprint` values and
//! the semaphore gates *which specific one* a caller receives. No two
//! concurrent sessions are ever handed the same fingerprint.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use rand::Rng;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::domain::value_objects::stealth_fingerprint::{
    BehaviorPlan, MouseMove, ScrollEvent, SessionStealthContext, StealthFingerprint,
};
use crate::shared::error::StealthPoolError;

/// Fixed-size pool of browser identities available for extraction sessions.
pub struct FingerprintPool {
    fingerprints: Vec<StealthFingerprint>,
    semaphore: Arc<Semaphore>,
    free_indices: StdMutex<VecDeque<usize>>,
}

impl FingerprintPool {
    /// Generates `size` coherent, distinct fingerprints up front.
    pub fn new(size: usize) -> Arc<Self> {
        let fingerprints = (0..size as u32).map(generate_fingerprint).collect();
        Arc::new(Self {
            fingerprints,
            semaphore: Arc::new(Semaphore::new(size)),
            free_indices: StdMutex::new((0..size).collect()),
        })
    }

    /// Waits for a fingerprint to become free, then hands out a fresh
    /// per-session context (seeded localStorage plus a behavior plan)
    /// built around it. The fingerprint is returned to the pool when
    /// the returned guard is dropped.
    pub async fn acquire(self: &Arc<Self>) -> FingerprintGuard {
        let permit = self.semaphore.clone().acquire_owned().await.expect("pool semaphore closed");
        let index = self.take_free_index();
        let fingerprint = self.fingerprints[index].clone();

        FingerprintGuard {
            pool: Arc::clone(self),
            index,
            context: build_session_context(fingerprint),
            _permit: permit,
        }
    }

    /// Non-blocking variant used when the controller wants to fail fast
    /// rather than queue behind other extraction attempts.
    pub fn try_acquire(self: &Arc<Self>) -> Result<FingerprintGuard, StealthPoolError> {
        let permit = self.semaphore.clone().try_acquire_owned().map_err(|_| StealthPoolError::Exhausted)?;
        let index = self.take_free_index();
        let fingerprint = self.fingerprints[index].clone();

        Ok(FingerprintGuard {
            pool: Arc::clone(self),
            index,
            context: build_session_context(fingerprint),
            _permit: permit,
        })
    }

    fn take_free_index(&self) -> usize {
        self.free_indices
            .lock()
            .expect("fingerprint pool free-list lock poisoned")
            .pop_front()
            .expect("semaphore permit acquired but no free index available")
    }

    fn return_index(&self, index: usize) {
        self.free_indices.lock().expect("fingerprint pool free-list lock poisoned").push_back(index);
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Holds exclusive use of one pool fingerprint. Dropping it releases
/// the fingerprint back to the pool for reuse by another session.
pub struct FingerprintGuard {
    pool: Arc<FingerprintPool>,
    index: usize,
    context: SessionStealthContext,
    _permit: OwnedSemaphorePermit,
}

impl FingerprintGuard {
    pub fn context(&self) -> &SessionStealthContext {
        &self.context
    }
}

impl Drop for FingerprintGuard {
    fn drop(&mut self) {
        self.pool.return_index(self.index);
    }
}

fn generate_fingerprint(id: u32) -> StealthFingerprint {
    let mut rng = rand::thread_rng();

    let (viewport_width, viewport_height) =
        StealthFingerprint::VIEWPORTS[rng.gen_range(0..StealthFingerprint::VIEWPORTS.len())];
    let device_pixel_ratio =
        StealthFingerprint::DEVICE_PIXEL_RATIOS[rng.gen_range(0..StealthFingerprint::DEVICE_PIXEL_RATIOS.len())];
    let hardware_concurrency = StealthFingerprint::HARDWARE_CONCURRENCIES
        [rng.gen_range(0..StealthFingerprint::HARDWARE_CONCURRENCIES.len())];
    let device_memory =
        StealthFingerprint::DEVICE_MEMORIES[rng.gen_range(0..StealthFingerprint::DEVICE_MEMORIES.len())];
    let language = StealthFingerprint::LANGUAGES[rng.gen_range(0..StealthFingerprint::LANGUAGES.len())];
    let timezone = StealthFingerprint::timezone_for_language(language);

    StealthFingerprint {
        id,
        user_agent: format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.{}.0 Safari/537.36",
            rng.gen_range(0..200)
        ),
        platform: "Win32".to_string(),
        language: language.to_string(),
        timezone: timezone.to_string(),
        viewport_width,
        viewport_height,
        device_pixel_ratio,
        hardware_concurrency,
        device_memory,
        navigator_overrides: std::collections::HashMap::new(),
    }
}

/// Builds a fresh per-session context around a pool fingerprint: seeded
/// localStorage plus a randomized but plausible pre-click behavior plan.
fn build_session_context(fingerprint: StealthFingerprint) -> SessionStealthContext {
    let mut rng = rand::thread_rng();

    let mut local_storage = std::collections::HashMap::new();
    local_storage.insert("volume".to_string(), format!("{:.2}", rng.gen_range(0.3..1.0)));
    local_storage.insert("theme".to_string(), "dark".to_string());

    let mouse_moves = (0..rng.gen_range(2..5))
        .map(|_| MouseMove {
            x: rng.gen_range(50..fingerprint.viewport_width as i32 - 50),
            y: rng.gen_range(50..fingerprint.viewport_height as i32 - 50),
            control_x: rng.gen_range(0..fingerprint.viewport_width as i32),
            control_y: rng.gen_range(0..fingerprint.viewport_height as i32),
        })
        .collect();

    let scroll_events = (0..rng.gen_range(0..2)).map(|_| ScrollEvent { delta_y: rng.gen_range(80..400) }).collect();

    SessionStealthContext {
        fingerprint,
        local_storage,
        behavior_plan: BehaviorPlan { mouse_moves, scroll_events, tab_before_click: rng.gen_bool(0.3) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_hands_out_distinct_fingerprints_concurrently() {
        let pool = FingerprintPool::new(2);
        let guard_a = pool.acquire().await;
        let guard_b = pool.acquire().await;
        assert_ne!(guard_a.context().fingerprint.id, guard_b.context().fingerprint.id);
        assert_eq!(pool.available(), 0);
    }

    #[tokio::test]
    async fn dropping_a_guard_releases_its_fingerprint() {
        let pool = FingerprintPool::new(1);
        {
            let _guard = pool.acquire().await;
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn try_acquire_fails_fast_when_exhausted() {
        let pool = FingerprintPool::new(1);
        let _guard = pool.acquire().await;
        let result = pool.try_acquire();
        assert!(matches!(result, Err(StealthPoolError::Exhausted)));
    }

    #[tokio::test]
    async fn released_fingerprint_is_reused() {
        let pool = FingerprintPool::new(1);
        let first_id = {
            let guard = pool.acquire().await;
            guard.context().fingerprint.id
        };
        let guard = pool.acquire().await;
        assert_eq!(guard.context().fingerprint.id, first_id);
    }
}
