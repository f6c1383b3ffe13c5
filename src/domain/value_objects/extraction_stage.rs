//! ExtractionStage value object
//!
//! The ordered stage machine an ExtractionSession moves through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One stage of the iframe-chain traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionStage {
    Connecting,
    LoadingVidsrc,
    LoadingRcp,
    FindingPlayButton,
    ClickingPlayButton,
    LoadingProRcp,
    LoadingShadowlands,
    ExtractingUrl,
    Complete,
    Failed,
}

impl ExtractionStage {
    /// Loading-progress percentage emitted at stage entry.
    pub fn progress_percent(&self) -> u8 {
        match self {
            ExtractionStage::Connecting => 0,
            ExtractionStage::LoadingVidsrc => 10,
            ExtractionStage::LoadingRcp => 30,
            ExtractionStage::FindingPlayButton | ExtractionStage::ClickingPlayButton => 50,
            ExtractionStage::LoadingProRcp => 70,
            ExtractionStage::LoadingShadowlands | ExtractionStage::ExtractingUrl => 90,
            ExtractionStage::Complete => 100,
            ExtractionStage::Failed => 100,
        }
    }

    /// Human-readable phase name emitted alongside progress.
    pub fn phase_name(&self) -> &'static str {
        match self {
            ExtractionStage::Connecting => "Connecting",
            ExtractionStage::LoadingVidsrc => "Loading video source",
            ExtractionStage::LoadingRcp => "Loading player",
            ExtractionStage::FindingPlayButton => "Finding play button",
            ExtractionStage::ClickingPlayButton => "Starting playback",
            ExtractionStage::LoadingProRcp => "Preparing stream",
            ExtractionStage::LoadingShadowlands => "Resolving stream source",
            ExtractionStage::ExtractingUrl => "Extracting stream URL",
            ExtractionStage::Complete => "Complete",
            ExtractionStage::Failed => "Failed",
        }
    }

    /// The next stage in the fixed stage sequence, if any.
    pub fn next(&self) -> Option<ExtractionStage> {
        use ExtractionStage::*;
        match self {
            Connecting => Some(LoadingVidsrc),
            LoadingVidsrc => Some(LoadingRcp),
            LoadingRcp => Some(FindingPlayButton),
            FindingPlayButton => Some(ClickingPlayButton),
            ClickingPlayButton => Some(LoadingProRcp),
            LoadingProRcp => Some(LoadingShadowlands),
            LoadingShadowlands => Some(ExtractingUrl),
            ExtractingUrl => Some(Complete),
            Complete | Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExtractionStage::Complete | ExtractionStage::Failed)
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase_name())
    }
}
