//! Thumbnail rendering - self-contained `data:` previews.
//!
//! Images are decoded in-process; video frames are captured through an
//! `ffmpeg` subprocess and then scaled with the same policy. Scaling
//! preserves aspect ratio, bounds the longer side by `max_side`, and never
//! upscales. Every failure path yields an empty string.

use std::io::Cursor;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageReader};
use marina_core::ProbeConfig;
use tokio::process::Command;

use crate::video::VideoProbe;

/// Kept back from the end of the stream to avoid end-of-stream artifacts
/// when capturing the frame.
const SEEK_EPSILON_SECS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    /// Bound on the longer side of the output.
    pub max_side: u32,
    /// JPEG quality, `0.0..=1.0`.
    pub quality: f32,
    /// Frame timestamp for video input, clamped to the stream length.
    pub video_seek_seconds: f64,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_side: 512,
            quality: 0.85,
            video_seek_seconds: 0.0,
        }
    }
}

pub struct Thumbnailer {
    config: ProbeConfig,
    video: VideoProbe,
}

impl Thumbnailer {
    pub fn new(config: ProbeConfig) -> Self {
        let video = VideoProbe::new(config.clone());
        Self { config, video }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Render a preview for the blob, keyed by its declared content type.
    /// Unrecognized kinds and all decode failures render as an empty
    /// string; this is a soft failure, never an error.
    pub async fn render(&self, data: &[u8], content_type: &str, opts: &ThumbnailOptions) -> String {
        let kind = content_type.to_ascii_lowercase();
        if kind.starts_with("image/") {
            match Self::render_image(data, opts) {
                Ok(preview) => preview,
                Err(e) => {
                    tracing::debug!(error = %e, "image thumbnail failed");
                    String::new()
                }
            }
        } else if kind.starts_with("video/") {
            match tokio::time::timeout(self.timeout(), self.render_video(data, opts)).await {
                Ok(Ok(preview)) => preview,
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, "video thumbnail failed");
                    String::new()
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = self.config.timeout_secs,
                        "video thumbnail timed out"
                    );
                    String::new()
                }
            }
        } else {
            String::new()
        }
    }

    fn render_image(data: &[u8], opts: &ThumbnailOptions) -> Result<String> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;
        Self::encode_scaled(&img, opts)
    }

    /// Capture one frame at the clamped seek position, then scale/encode it
    /// like an image input.
    async fn render_video(&self, data: &[u8], opts: &ThumbnailOptions) -> Result<String> {
        let duration = self.video.info(data).await.map(|i| i.duration_seconds);
        let seek = clamp_seek(opts.video_seek_seconds, duration);

        let dir = tempfile::Builder::new().prefix("marina-frame-").tempdir()?;
        let input_path = dir.path().join("input");
        let frame_path = dir.path().join("frame.png");
        tokio::fs::write(&input_path, data).await?;

        let output = Command::new(&self.config.ffmpeg_path)
            .args(["-y", "-ss", &format!("{seek:.3}")])
            .arg("-i")
            .arg(&input_path)
            .args(["-frames:v", "1", "-f", "image2"])
            .arg(&frame_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffmpeg failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let frame = tokio::fs::read(&frame_path).await?;
        let img = ImageReader::new(Cursor::new(frame.as_slice()))
            .with_guessed_format()?
            .decode()?;
        Self::encode_scaled(&img, opts)
    }

    /// Downscale (never upscale) so the longer side fits `max_side`, then
    /// encode as a base64 JPEG data string.
    fn encode_scaled(img: &DynamicImage, opts: &ThumbnailOptions) -> Result<String> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(anyhow!("empty image"));
        }

        let max = opts.max_side.max(1) as f32;
        let scale = (max / width as f32).min(max / height as f32).min(1.0);
        let target_w = ((width as f32 * scale).round() as u32).max(1);
        let target_h = ((height as f32 * scale).round() as u32).max(1);

        let scaled = if scale < 1.0 {
            let filter = select_filter(width.max(height), target_w.max(target_h));
            img.resize_exact(target_w, target_h, filter)
        } else {
            img.clone()
        };

        let quality = (opts.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
        let rgb = DynamicImage::ImageRgb8(scaled.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .context("JPEG encode failed")?;

        Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&buffer)))
    }
}

/// Cheaper filters for aggressive downscales, sharper ones near 1:1.
fn select_filter(orig_side: u32, target_side: u32) -> FilterType {
    let ratio = orig_side as f32 / target_side.max(1) as f32;
    if ratio > 2.0 {
        FilterType::Triangle
    } else if ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Clamp the requested seek to `[0, duration - epsilon]` when the stream
/// length is known.
pub(crate) fn clamp_seek(requested_seconds: f64, duration_seconds: Option<f64>) -> f64 {
    let requested = if requested_seconds.is_finite() {
        requested_seconds.max(0.0)
    } else {
        0.0
    };
    match duration_seconds {
        Some(d) if d > 0.0 => requested.min((d - SEEK_EPSILON_SECS).max(0.0)),
        _ => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buffer
    }

    fn decode_preview(preview: &str) -> (u32, u32) {
        let b64 = preview
            .strip_prefix("data:image/jpeg;base64,")
            .expect("data url prefix");
        let jpeg = BASE64.decode(b64).unwrap();
        crate::image_probe::ImageProbe::dimensions(&jpeg).unwrap()
    }

    fn thumbnailer() -> Thumbnailer {
        Thumbnailer::new(ProbeConfig::default())
    }

    #[tokio::test]
    async fn test_large_image_is_bounded_by_max_side() {
        let data = create_test_image(800, 600);
        let opts = ThumbnailOptions {
            max_side: 256,
            ..Default::default()
        };
        let preview = thumbnailer().render(&data, "image/png", &opts).await;
        let (w, h) = decode_preview(&preview);
        assert_eq!((w, h), (256, 192));
    }

    #[tokio::test]
    async fn test_small_image_is_never_upscaled() {
        let data = create_test_image(100, 50);
        let preview = thumbnailer()
            .render(&data, "image/png", &ThumbnailOptions::default())
            .await;
        let (w, h) = decode_preview(&preview);
        assert_eq!((w, h), (100, 50));
    }

    #[tokio::test]
    async fn test_tall_image_keeps_aspect_ratio() {
        let data = create_test_image(300, 900);
        let opts = ThumbnailOptions {
            max_side: 300,
            ..Default::default()
        };
        let preview = thumbnailer().render(&data, "image/png", &opts).await;
        let (w, h) = decode_preview(&preview);
        assert_eq!(h, 300);
        assert_eq!(w, 100);
    }

    #[tokio::test]
    async fn test_unrecognized_kind_renders_empty() {
        let t = thumbnailer();
        assert_eq!(
            t.render(b"%PDF-1.4", "application/pdf", &ThumbnailOptions::default())
                .await,
            ""
        );
        assert_eq!(t.render(b"", "", &ThumbnailOptions::default()).await, "");
    }

    #[tokio::test]
    async fn test_malformed_image_renders_empty() {
        let preview = thumbnailer()
            .render(b"not an image", "image/jpeg", &ThumbnailOptions::default())
            .await;
        assert_eq!(preview, "");
    }

    #[tokio::test]
    async fn test_video_without_capture_tool_renders_empty() {
        let t = Thumbnailer::new(ProbeConfig {
            ffmpeg_path: "ffmpeg-does-not-exist".to_string(),
            ffprobe_path: "ffprobe-does-not-exist".to_string(),
            ..ProbeConfig::default()
        });
        let preview = t
            .render(b"garbage", "video/mp4", &ThumbnailOptions::default())
            .await;
        assert_eq!(preview, "");
    }

    #[test]
    fn test_clamp_seek() {
        // unknown length: requested position passes through
        assert_eq!(clamp_seek(2.0, None), 2.0);
        // known length: held back from the end of the stream
        assert_eq!(clamp_seek(60.0, Some(10.0)), 9.9);
        assert_eq!(clamp_seek(1.0, Some(10.0)), 1.0);
        // degenerate inputs
        assert_eq!(clamp_seek(-5.0, Some(10.0)), 0.0);
        assert_eq!(clamp_seek(f64::NAN, Some(10.0)), 0.0);
        assert_eq!(clamp_seek(1.0, Some(0.05)), 0.0);
    }
}
