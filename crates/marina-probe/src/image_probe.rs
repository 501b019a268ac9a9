//! Image probing - intrinsic pixel dimensions.

use std::io::Cursor;

use async_trait::async_trait;
use image::{GenericImageView, ImageReader};

use crate::traits::MetadataProbe;

/// Dimension probe for raster blobs.
///
/// Two strategies in order, each failure-isolated: a header-only dimension
/// read, then a full decode for formats whose headers the fast path cannot
/// handle. Malformed input probes as `None`, never as an error.
pub struct ImageProbe;

impl ImageProbe {
    pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
        Self::header_dimensions(data).or_else(|| Self::decoded_dimensions(data))
    }

    fn header_dimensions(data: &[u8]) -> Option<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }

    fn decoded_dimensions(data: &[u8]) -> Option<(u32, u32)> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .decode()
            .ok()?;
        Some(img.dimensions())
    }
}

#[async_trait]
impl MetadataProbe for ImageProbe {
    type Output = (u32, u32);

    async fn probe(&self, data: &[u8]) -> Option<Self::Output> {
        Self::dimensions(data)
    }
}
