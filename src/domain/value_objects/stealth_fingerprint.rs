//! StealthFingerprint value object
//!
//! A coherent bundle of browser identity signals presented to anti-bot
//! systems during extraction. Exactly one is attached to each
//! ExtractionSession.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coherent desktop browser identity, generated once at pool startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StealthFingerprint {
    /// Stable identity within the pool (index-derived, never reused concurrently).
    pub id: u32,
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    pub timezone: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_pixel_ratio: f32,
    pub hardware_concurrency: u32,
    pub device_memory: u32,
    /// `navigator` property overrides applied before the first navigation.
    pub navigator_overrides: HashMap<String, String>,
}

/// Per-session additions layered on top of a pool fingerprint: seeded
/// localStorage entries and a human-behavior plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStealthContext {
    pub fingerprint: StealthFingerprint,
    pub local_storage: HashMap<String, String>,
    pub behavior_plan: BehaviorPlan,
}

/// A plan of synthetic human-like interactions executed before the
/// play-button click, so automation detectors see plausible motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPlan {
    pub mouse_moves: Vec<MouseMove>,
    pub scroll_events: Vec<ScrollEvent>,
    pub tab_before_click: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseMove {
    pub x: i32,
    pub y: i32,
    /// Bezier control point used to interpolate the path to this point.
    pub control_x: i32,
    pub control_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub delta_y: i32,
}

impl StealthFingerprint {
    /// Desktop viewport sizes a pool fingerprint is drawn from.
    pub const VIEWPORTS: [(u32, u32); 4] = [(1920, 1080), (1536, 864), (1366, 768), (2560, 1440)];
    pub const DEVICE_PIXEL_RATIOS: [f32; 4] = [1.0, 1.25, 1.5, 2.0];
    pub const HARDWARE_CONCURRENCIES: [u32; 4] = [4, 8, 12, 16];
    pub const DEVICE_MEMORIES: [u32; 3] = [4, 8, 16];
    pub const LANGUAGES: [&'static str; 5] = ["en-US", "en-GB", "es-ES", "fr-FR", "de-DE"];

    /// The timezone that coheres with a given language tag.
    pub fn timezone_for_language(language: &str) -> &'static str {
        match language {
            "en-US" => "America/New_York",
            "en-GB" => "Europe/London",
            "es-ES" => "Europe/Madrid",
            "fr-FR" => "Europe/Paris",
            "de-DE" => "Europe/Berlin",
            _ => "UTC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_mapping_covers_all_languages() {
        for lang in StealthFingerprint::LANGUAGES {
            assert_ne!(StealthFingerprint::timezone_for_language(lang), "UTC");
        }
    }
}
