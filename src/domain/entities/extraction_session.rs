//! ExtractionSession and IframeStep entities
//!
//! An ExtractionSession is created per extraction attempt and mutated
//! only by the ExtractionEngine; it is discarded once its result is
//! cached or the attempt fails terminally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{CatalogRef, ExtractionStage, StealthFingerprint};

/// Which execution mode produced (or attempted) this session's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    Browser,
    Http,
}

impl ExtractionMode {
    /// The other mode, used when the controller retries with the alternate path.
    pub fn alternate(&self) -> ExtractionMode {
        match self {
            ExtractionMode::Browser => ExtractionMode::Http,
            ExtractionMode::Http => ExtractionMode::Browser,
        }
    }
}

/// Kind of iframe encountered while walking the embed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IframeKind {
    Vidsrc,
    Rcp,
    ProRcp,
    Shadowlands,
}

/// One hop in the iframe chain; append-only within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IframeStep {
    pub index: u32,
    pub kind: IframeKind,
    pub url: String,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

/// Observed outcome of navigating to or parsing one iframe step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Ok,
    HttpError { status: u16 },
    ParseError { detail: String },
    Timeout,
}

/// A single extraction attempt: created when the controller dispatches
/// to the engine, mutated only by the engine, and terminated by a
/// transition to `Complete` or `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSession {
    pub session_id: Uuid,
    pub catalog_ref: CatalogRef,
    pub server: String,
    pub fingerprint: StealthFingerprint,
    pub mode: ExtractionMode,
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
    pub stage: ExtractionStage,
    pub steps: Vec<IframeStep>,
}

impl ExtractionSession {
    pub fn new(
        catalog_ref: CatalogRef,
        server: impl Into<String>,
        fingerprint: StealthFingerprint,
        mode: ExtractionMode,
        attempt: u32,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            catalog_ref,
            server: server.into(),
            fingerprint,
            mode,
            attempt,
            started_at: Utc::now(),
            stage: ExtractionStage::Connecting,
            steps: Vec::new(),
        }
    }

    /// Advances the session to the next stage in the fixed protocol order.
    pub fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            self.stage = next;
        }
    }

    pub fn fail(&mut self) {
        self.stage = ExtractionStage::Failed;
    }

    pub fn record_step(&mut self, step: IframeStep) {
        self.steps.push(step);
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fingerprint() -> StealthFingerprint {
        StealthFingerprint {
            id: 0,
            user_agent: "test-agent".to_string(),
            platform: "Win32".to_string(),
            language: "en-US".to_string(),
            timezone: "America/New_York".to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            device_pixel_ratio: 1.0,
            hardware_concurrency: 8,
            device_memory: 8,
            navigator_overrides: HashMap::new(),
        }
    }

    #[test]
    fn new_session_starts_connecting_and_not_terminal() {
        let session = ExtractionSession::new(
            CatalogRef::movie(550).unwrap(),
            "vidsrc",
            fingerprint(),
            ExtractionMode::Browser,
            1,
        );
        assert_eq!(session.stage, crate::domain::value_objects::ExtractionStage::Connecting);
        assert!(!session.is_terminal());
    }

    #[test]
    fn fail_transitions_directly_to_failed_regardless_of_stage() {
        let mut session = ExtractionSession::new(
            CatalogRef::movie(550).unwrap(),
            "vidsrc",
            fingerprint(),
            ExtractionMode::Browser,
            1,
        );
        session.advance();
        session.fail();
        assert!(session.is_terminal());
    }

    #[test]
    fn alternate_mode_toggles() {
        assert_eq!(ExtractionMode::Browser.alternate(), ExtractionMode::Http);
        assert_eq!(ExtractionMode::Http.alternate(), ExtractionMode::Browser);
    }
}
