//! Probe facade used by the collection manager.

use bytes::Bytes;
use marina_core::{ProbeConfig, SourceFile};

use crate::image_probe::ImageProbe;
use crate::locator::{ScratchStore, TempLocator};
use crate::meta::{MediaMeta, VideoInfo};
use crate::thumbnail::{ThumbnailOptions, Thumbnailer};
use crate::traits::MetadataProbe;
use crate::video::VideoProbe;

/// Stateless-per-call probe bundle: scratch store, dimension/duration
/// probes, and the thumbnailer. Holds configuration only; no state crosses
/// calls.
pub struct MediaProbe {
    scratch: ScratchStore,
    image: ImageProbe,
    video: VideoProbe,
    thumbnailer: Thumbnailer,
}

impl MediaProbe {
    /// Probe with an active session scratch store.
    pub fn new(config: ProbeConfig) -> std::io::Result<Self> {
        Ok(Self {
            scratch: ScratchStore::active()?,
            image: ImageProbe,
            video: VideoProbe::new(config.clone()),
            thumbnailer: Thumbnailer::new(config),
        })
    }

    /// Headless probe: locator acquisition degrades to empty locators with
    /// no-op releases. Metadata and thumbnail derivation still work, they
    /// operate on the in-memory bytes.
    pub fn detached(config: ProbeConfig) -> Self {
        Self {
            scratch: ScratchStore::detached(),
            image: ImageProbe,
            video: VideoProbe::new(config.clone()),
            thumbnailer: Thumbnailer::new(config),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.scratch.is_detached()
    }

    /// Acquire a transient locator for the blob; see [`ScratchStore::acquire`].
    pub async fn acquire_locator(&self, data: &Bytes, original_name: &str) -> TempLocator {
        self.scratch.acquire(data, original_name).await
    }

    /// Intrinsic pixel size of a raster blob, or `None`.
    pub fn image_dimensions(&self, data: &[u8]) -> Option<(u32, u32)> {
        ImageProbe::dimensions(data)
    }

    /// Display resolution and duration of a video blob, or `None`.
    pub async fn video_info(&self, data: &[u8]) -> Option<VideoInfo> {
        self.video.info(data).await
    }

    /// Self-contained preview string, or empty on any failure.
    pub async fn render_thumbnail(
        &self,
        data: &[u8],
        content_type: &str,
        opts: &ThumbnailOptions,
    ) -> String {
        self.thumbnailer.render(data, content_type, opts).await
    }

    /// Best-effort metadata keyed by the candidate's declared MIME
    /// category; empty for unrecognized types.
    pub async fn extract_meta(&self, file: &SourceFile) -> MediaMeta {
        if file.is_image() {
            let dims = self.image.probe(&file.data).await;
            MediaMeta {
                width: dims.map(|(w, _)| w),
                height: dims.map(|(_, h)| h),
                duration_seconds: None,
            }
        } else if file.is_video() {
            match self.video.probe(&file.data).await {
                Some(info) => MediaMeta {
                    width: Some(info.width),
                    height: Some(info.height),
                    duration_seconds: Some(info.duration_seconds),
                },
                None => MediaMeta::default(),
            }
        } else {
            MediaMeta::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn create_test_image(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 10, 255]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        Bytes::from(buffer)
    }

    fn detached_probe() -> MediaProbe {
        MediaProbe::detached(ProbeConfig {
            ffprobe_path: "ffprobe-does-not-exist".to_string(),
            ffmpeg_path: "ffmpeg-does-not-exist".to_string(),
            ..ProbeConfig::default()
        })
    }

    #[tokio::test]
    async fn test_extract_meta_for_image() {
        let probe = detached_probe();
        let file = SourceFile::new("a.png", "image/png", create_test_image(40, 30));
        let meta = probe.extract_meta(&file).await;
        assert_eq!(meta.width, Some(40));
        assert_eq!(meta.height, Some(30));
        assert_eq!(meta.duration_seconds, None);
    }

    #[tokio::test]
    async fn test_extract_meta_for_unrecognized_type() {
        let probe = detached_probe();
        let file = SourceFile::new("a.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.4"));
        assert!(probe.extract_meta(&file).await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_meta_for_undecodable_video() {
        let probe = detached_probe();
        let file = SourceFile::new("a.mp4", "video/mp4", Bytes::from_static(b"not a video"));
        assert!(probe.extract_meta(&file).await.is_empty());
    }

    #[tokio::test]
    async fn test_detached_probe_still_derives_previews() {
        let probe = detached_probe();
        let data = create_test_image(64, 64);
        let locator = probe.acquire_locator(&data, "a.png").await;
        assert!(locator.locator.is_detached());

        let preview = probe
            .render_thumbnail(&data, "image/png", &ThumbnailOptions::default())
            .await;
        assert!(preview.starts_with("data:image/jpeg;base64,"));
    }
}
