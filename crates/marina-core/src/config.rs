//! Configuration surface for the intake pipeline.
//!
//! Accepted at construction only: per-category capacity overrides,
//! per-category URL-admission overrides, probe tool paths and the probe
//! timeout, and thumbnail enrichment parameters. Defaults reproduce the
//! category table in `MediaCategory`.

use std::collections::HashMap;

use crate::category::{Capacity, MediaCategory};

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_THUMBNAIL_MAX_SIDE: u32 = 480;
const DEFAULT_THUMBNAIL_QUALITY: f32 = 0.85;
const DEFAULT_VIDEO_THUMBNAIL_SEEK_SECS: f64 = 1.0;

/// External tool configuration for probes that shell out.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    /// Bound on any single subprocess-backed probe; expiry counts as probe
    /// failure, never as an admission error.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

/// Intake configuration for one draft listing.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    capacities: HashMap<MediaCategory, Capacity>,
    allow_url: HashMap<MediaCategory, bool>,
    pub probe: ProbeConfig,
    /// Longer-side bound for enrichment thumbnails.
    pub thumbnail_max_side: u32,
    /// JPEG quality for enrichment thumbnails, `0.0..=1.0`.
    pub thumbnail_quality: f32,
    /// Frame timestamp for video enrichment thumbnails.
    pub video_thumbnail_seek_secs: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            capacities: HashMap::new(),
            allow_url: HashMap::new(),
            probe: ProbeConfig::default(),
            thumbnail_max_side: DEFAULT_THUMBNAIL_MAX_SIDE,
            thumbnail_quality: DEFAULT_THUMBNAIL_QUALITY,
            video_thumbnail_seek_secs: DEFAULT_VIDEO_THUMBNAIL_SEEK_SECS,
        }
    }
}

impl IntakeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the item limit for one category.
    pub fn with_capacity(mut self, category: MediaCategory, capacity: Capacity) -> Self {
        self.capacities.insert(category, capacity);
        self
    }

    /// Override URL admission for one category.
    pub fn with_url_admission(mut self, category: MediaCategory, allowed: bool) -> Self {
        self.allow_url.insert(category, allowed);
        self
    }

    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    /// Effective limit for a category (override or default).
    pub fn capacity_for(&self, category: MediaCategory) -> Capacity {
        self.capacities
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_capacity())
    }

    /// Effective URL admission for a category (override or default).
    pub fn allows_url(&self, category: MediaCategory) -> bool {
        self.allow_url
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.allows_url_by_default())
    }
}
