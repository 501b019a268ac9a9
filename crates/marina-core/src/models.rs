//! Domain models for the intake pipeline: candidate files, dedup
//! signatures, resource locators, and admitted media items.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::category::MediaCategory;

/// A candidate file offered for admission (name, declared content type, and
/// the raw bytes). Not yet part of any collection.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Exact-match dedup signature for this candidate.
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            size_bytes: self.size_bytes(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("video/")
    }
}

/// Exact (name, content type, size) tuple used for per-category dedup.
/// Two genuinely distinct files sharing all three attributes collide; the
/// pipeline intentionally does not hash content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Admission hint carried by URL items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlKind {
    VirtualTour,
    Video,
    Document,
    Image,
}

/// Where an item's bytes can be reached.
///
/// File items hold a transient scratch path valid only for the current
/// session; URL items hold the external address itself. `Detached` is the
/// headless mode where no scratch store is available — callers must
/// tolerate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaLocator {
    Scratch(PathBuf),
    Remote(Url),
    Detached,
}

impl MediaLocator {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaLocator::Scratch(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaLocator::Remote(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, MediaLocator::Detached)
    }
}

impl fmt::Display for MediaLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaLocator::Scratch(path) => write!(f, "{}", path.display()),
            MediaLocator::Remote(url) => f.write_str(url.as_str()),
            MediaLocator::Detached => Ok(()),
        }
    }
}

/// Idempotent cleanup handle for a transient scratch file.
///
/// Safe to call any number of times, and safe to call even if the locator
/// was never dereferenced. Dropping the handle without calling `release`
/// leaks the scratch file for the rest of the session.
#[derive(Clone)]
pub struct ReleaseHandle {
    path: Option<PathBuf>,
    released: Arc<AtomicBool>,
}

impl ReleaseHandle {
    /// Handle bound to a scratch file.
    pub fn for_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// No-op handle for detached locators.
    pub fn noop() -> Self {
        Self {
            path: None,
            released: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Delete the underlying scratch file. Only the first call has any
    /// effect; deletion errors are logged and swallowed.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::debug!(path = %path.display(), error = %e, "scratch file release failed");
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("path", &self.path)
            .field("released", &self.is_released())
            .finish()
    }
}

/// One accepted media unit within a category collection.
///
/// Created only by a successful admission; mutated only by renumbering,
/// primary-photo transfer, and the enrichment step of its own admission
/// call. `order` is dense `0..n-1` within the category after every
/// structural change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    pub category: MediaCategory,
    /// Original file name, or the literal URL string for URL items.
    pub name: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub locator: MediaLocator,
    /// Self-contained `data:` preview string, when derivable.
    pub thumbnail: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_seconds: Option<f64>,
    pub order: usize,
    /// Meaningful only within the primary-photos category.
    pub primary: bool,
    pub url_kind: Option<UrlKind>,
    pub added_at: DateTime<Utc>,
    /// Cleanup for the transient scratch locator; absent for URL items.
    #[serde(skip)]
    pub release: Option<ReleaseHandle>,
}

impl MediaItem {
    /// Skeleton for a file admission; optional metadata stays unset until
    /// enrichment writes it back.
    pub fn from_file(
        category: MediaCategory,
        file: &SourceFile,
        locator: MediaLocator,
        release: ReleaseHandle,
        order: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            name: file.name.clone(),
            content_type: Some(file.content_type.clone()),
            size_bytes: Some(file.size_bytes()),
            locator,
            thumbnail: None,
            width: None,
            height: None,
            duration_seconds: None,
            order,
            primary: false,
            url_kind: None,
            added_at: Utc::now(),
            release: Some(release),
        }
    }

    /// Item for a URL admission; carries no transient handle.
    pub fn from_url(category: MediaCategory, url: Url, kind: Option<UrlKind>, order: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            name: url.as_str().to_string(),
            content_type: None,
            size_bytes: None,
            locator: MediaLocator::Remote(url),
            thumbnail: None,
            width: None,
            height: None,
            duration_seconds: None,
            order,
            primary: false,
            url_kind: kind,
            added_at: Utc::now(),
            release: None,
        }
    }
}
