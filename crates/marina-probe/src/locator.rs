//! Session-scoped scratch store backing transient locators.
//!
//! A file admission acquires a scratch copy of its bytes so the rest of the
//! application can dereference the item without holding the original blob.
//! The scratch directory lives for the session; individual files are
//! deleted by each item's idempotent release handle when the item is
//! removed.

use std::path::Path;

use bytes::Bytes;
use marina_core::{MediaLocator, ReleaseHandle};
use tempfile::TempDir;
use uuid::Uuid;

/// A transient, revocable handle to blob bytes.
#[derive(Debug, Clone)]
pub struct TempLocator {
    pub locator: MediaLocator,
    pub release: ReleaseHandle,
}

impl TempLocator {
    fn detached() -> Self {
        Self {
            locator: MediaLocator::Detached,
            release: ReleaseHandle::noop(),
        }
    }
}

/// Scratch directory for one intake session.
///
/// `detached()` is the headless mode: acquisition yields an empty locator
/// and a no-op release, and callers must tolerate both.
#[derive(Debug)]
pub struct ScratchStore {
    dir: Option<TempDir>,
}

impl ScratchStore {
    /// Store backed by a fresh temporary directory, removed when the store
    /// is dropped.
    pub fn active() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("marina-media-").tempdir()?;
        Ok(Self { dir: Some(dir) })
    }

    /// Store with no backing directory.
    pub fn detached() -> Self {
        Self { dir: None }
    }

    pub fn is_detached(&self) -> bool {
        self.dir.is_none()
    }

    /// Copy `data` into the scratch directory and return a locator plus its
    /// release handle. Any write failure degrades to a detached locator;
    /// acquisition never fails an admission.
    pub async fn acquire(&self, data: &Bytes, original_name: &str) -> TempLocator {
        let Some(dir) = &self.dir else {
            return TempLocator::detached();
        };

        let path = dir.path().join(scratch_file_name(original_name));
        match tokio::fs::write(&path, data).await {
            Ok(()) => TempLocator {
                locator: MediaLocator::Scratch(path.clone()),
                release: ReleaseHandle::for_path(path),
            },
            Err(e) => {
                tracing::warn!(name = original_name, error = %e, "scratch write failed; locator degraded");
                TempLocator::detached()
            }
        }
    }
}

/// Unique scratch file name preserving the original extension when it is a
/// plain token.
fn scratch_file_name(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        Some(ext) => format!("{}.{}", id, ext.to_ascii_lowercase()),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_writes_scratch_copy() {
        let store = ScratchStore::active().unwrap();
        let data = Bytes::from_static(b"hello media");
        let acquired = store.acquire(&data, "deck.JPG").await;

        let path = acquired.locator.as_path().expect("scratch locator").to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"hello media");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
    }

    #[tokio::test]
    async fn test_release_deletes_scratch_file_once() {
        let store = ScratchStore::active().unwrap();
        let acquired = store.acquire(&Bytes::from_static(b"x"), "a.png").await;
        let path = acquired.locator.as_path().unwrap().to_path_buf();

        acquired.release.release();
        assert!(!path.exists());
        // idempotent
        acquired.release.release();
    }

    #[tokio::test]
    async fn test_detached_store_yields_empty_locator() {
        let store = ScratchStore::detached();
        assert!(store.is_detached());
        let acquired = store.acquire(&Bytes::from_static(b"x"), "a.png").await;
        assert!(acquired.locator.is_detached());
        // release without dereference is safe
        acquired.release.release();
        acquired.release.release();
    }

    #[tokio::test]
    async fn test_two_acquisitions_never_collide() {
        let store = ScratchStore::active().unwrap();
        let a = store.acquire(&Bytes::from_static(b"a"), "same.png").await;
        let b = store.acquire(&Bytes::from_static(b"b"), "same.png").await;
        assert_ne!(a.locator.as_path(), b.locator.as_path());
    }

    #[test]
    fn test_scratch_file_name_strips_odd_extensions() {
        assert!(scratch_file_name("noext").rfind('.').is_none());
        assert!(scratch_file_name("weird.ex t").rfind('.').is_none());
        assert!(scratch_file_name("fine.webm").ends_with(".webm"));
    }
}
