//! Video probing - display resolution and duration.
//!
//! Two strategies in order, each failure-isolated: a native MP4 container
//! parse on the in-memory bytes, then an `ffprobe` subprocess for other
//! containers. The subprocess path is bounded by the configured probe
//! timeout; expiry counts as probe failure.

use std::io::Cursor;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use marina_core::ProbeConfig;
use tokio::process::Command;

use crate::meta::VideoInfo;
use crate::traits::MetadataProbe;

/// Clamp a container-reported duration to a finite, non-negative value.
/// Streaming containers with unknown length report as zero.
pub(crate) fn normalize_duration(duration_seconds: f64) -> f64 {
    if duration_seconds.is_finite() && duration_seconds >= 0.0 {
        duration_seconds
    } else {
        0.0
    }
}

pub struct VideoProbe {
    config: ProbeConfig,
}

impl VideoProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Best-effort container probe. Returns `None` on any decode failure.
    pub async fn info(&self, data: &[u8]) -> Option<VideoInfo> {
        if let Some(info) = Self::native_info(data) {
            return Some(info);
        }

        match tokio::time::timeout(self.timeout(), self.ffprobe_info(data)).await {
            Ok(Ok(info)) => Some(info),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "ffprobe fallback failed");
                None
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.config.timeout_secs, "video probe timed out");
                None
            }
        }
    }

    /// Fast path: parse the MP4 box structure without decoding any frames.
    fn native_info(data: &[u8]) -> Option<VideoInfo> {
        let reader = Cursor::new(data);
        let mp4 = mp4::Mp4Reader::read_header(reader, data.len() as u64).ok()?;
        let duration_seconds = normalize_duration(mp4.duration().as_secs_f64());

        let track = mp4
            .tracks()
            .values()
            .find(|t| matches!(t.track_type(), Ok(mp4::TrackType::Video)))?;

        Some(VideoInfo {
            width: u32::from(track.width()),
            height: u32::from(track.height()),
            duration_seconds,
        })
    }

    /// Fallback: write the blob to a scratch file and ask ffprobe for the
    /// first video stream and the container duration.
    async fn ffprobe_info(&self, data: &[u8]) -> Result<VideoInfo> {
        let temp_file = tempfile::NamedTempFile::new()?;
        tokio::fs::write(temp_file.path(), data).await?;

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(temp_file.path())
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let probe_data: serde_json::Value =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

        let stream = probe_data["streams"]
            .get(0)
            .ok_or_else(|| anyhow!("No video stream found"))?;

        let width = stream["width"]
            .as_u64()
            .ok_or_else(|| anyhow!("Could not parse width"))? as u32;
        let height = stream["height"]
            .as_u64()
            .ok_or_else(|| anyhow!("Could not parse height"))? as u32;

        let duration_seconds = probe_data["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .map(normalize_duration)
            .unwrap_or(0.0);

        Ok(VideoInfo {
            width,
            height,
            duration_seconds,
        })
    }
}

#[async_trait]
impl MetadataProbe for VideoProbe {
    type Output = VideoInfo;

    async fn probe(&self, data: &[u8]) -> Option<Self::Output> {
        self.info(data).await
    }
}
