//! Probe result types.

use serde::{Deserialize, Serialize};

/// Intrinsic metadata derived from a video container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Always finite and non-negative; containers reporting an unknown
    /// length probe as zero.
    pub duration_seconds: f64,
}

/// Combined best-effort metadata for one candidate, keyed by its declared
/// MIME category. Unrecognized types probe as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMeta {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_seconds: Option<f64>,
}

impl MediaMeta {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.duration_seconds.is_none()
    }
}
