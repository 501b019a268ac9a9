//! The collection manager - sole mutator of per-category media sequences.

use std::collections::{HashMap, HashSet};

use marina_core::{
    Capacity, IntakeConfig, IntakeError, MediaCategory, MediaItem, Signature, SourceFile, UrlKind,
};
use marina_probe::{MediaMeta, MediaProbe, ThumbnailOptions};
use tokio::sync::{watch, Mutex};
use url::Url;
use uuid::Uuid;

use crate::status::StatusNotice;
use crate::submission::{entry_for, SubmissionView};

/// Per-batch admission counters returned by [`CollectionManager::add_files`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub skipped_type: usize,
    pub skipped_duplicate: usize,
    /// The batch stopped because the category hit its limit.
    pub capacity_hit: bool,
}

/// Per-candidate admission decision.
enum Admission {
    Admitted(Uuid),
    SkippedType,
    SkippedDuplicate,
    AtCapacity,
}

#[derive(Default)]
struct CollectionState {
    collections: HashMap<MediaCategory, Vec<MediaItem>>,
    seen: HashMap<MediaCategory, HashSet<Signature>>,
}

impl CollectionState {
    fn items(&self, category: MediaCategory) -> &[MediaItem] {
        self.collections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn items_mut(&mut self, category: MediaCategory) -> &mut Vec<MediaItem> {
        self.collections.entry(category).or_default()
    }

    fn seen_mut(&mut self, category: MediaCategory) -> &mut HashSet<Signature> {
        self.seen.entry(category).or_default()
    }

    fn find_mut(&mut self, category: MediaCategory, id: Uuid) -> Option<&mut MediaItem> {
        self.items_mut(category).iter_mut().find(|i| i.id == id)
    }

    /// Re-derive dense `order` values `0..n-1` for one category.
    fn renumber(&mut self, category: MediaCategory) {
        for (index, item) in self.items_mut(category).iter_mut().enumerate() {
            item.order = index;
        }
    }
}

/// Enrichment write-back: looks the target up by id so results arriving
/// after a removal are dropped instead of resurrecting the item.
fn apply_enrichment(
    state: &mut CollectionState,
    category: MediaCategory,
    id: Uuid,
    meta: MediaMeta,
    thumbnail: String,
) {
    match state.find_mut(category, id) {
        Some(item) => {
            item.width = meta.width;
            item.height = meta.height;
            item.duration_seconds = meta.duration_seconds;
            if !thumbnail.is_empty() {
                item.thumbnail = Some(thumbnail);
            }
        }
        None => {
            tracing::debug!(%id, category = %category, "enrichment target no longer present; write dropped");
        }
    }
}

/// Ordered media collections for one draft listing.
pub struct CollectionManager {
    state: Mutex<CollectionState>,
    probe: MediaProbe,
    config: IntakeConfig,
    status: watch::Sender<Option<StatusNotice>>,
}

impl CollectionManager {
    pub fn new(probe: MediaProbe, config: IntakeConfig) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            state: Mutex::new(CollectionState::default()),
            probe,
            config,
            status,
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Room left in a category; unbounded categories stay unbounded.
    pub async fn remaining_capacity(&self, category: MediaCategory) -> Capacity {
        let state = self.state.lock().await;
        self.config
            .capacity_for(category)
            .remaining(state.items(category).len())
    }

    /// Snapshot of one category, in display order.
    pub async fn collection(&self, category: MediaCategory) -> Vec<MediaItem> {
        self.state.lock().await.items(category).to_vec()
    }

    pub async fn count(&self, category: MediaCategory) -> usize {
        self.state.lock().await.items(category).len()
    }

    /// Subscribe to status notices. Single slot: each emission replaces
    /// the previous value.
    pub fn subscribe_status(&self) -> watch::Receiver<Option<StatusNotice>> {
        self.status.subscribe()
    }

    /// The most recent notice, if any.
    pub fn last_notice(&self) -> Option<StatusNotice> {
        self.status.borrow().clone()
    }

    /// Admit a batch of candidate files, in input order.
    ///
    /// Candidates failing the category's MIME rule or already present in
    /// the dedup index are skipped silently; hitting the capacity limit
    /// stops the batch with an error notice. Admitted items are visible
    /// immediately with optional fields unset and are enriched in place
    /// before the call returns; enrichment failures only leave those
    /// fields absent. Admission of candidate *k* observes candidates
    /// `1..k-1` of the same batch.
    pub async fn add_files(&self, category: MediaCategory, files: Vec<SourceFile>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        if files.is_empty() {
            return outcome;
        }

        let capacity = self.config.capacity_for(category);

        for file in &files {
            match self.admit_file(category, file, capacity).await {
                Admission::AtCapacity => {
                    outcome.capacity_hit = true;
                    if let Capacity::Bounded(limit) = capacity {
                        self.emit(StatusNotice::error(
                            IntakeError::CapacityExceeded { category, limit }.to_string(),
                        ));
                    }
                    break;
                }
                Admission::SkippedType => {
                    outcome.skipped_type += 1;
                    tracing::debug!(
                        category = %category,
                        name = %file.name,
                        content_type = %file.content_type,
                        "candidate skipped: content type not accepted"
                    );
                }
                Admission::SkippedDuplicate => {
                    outcome.skipped_duplicate += 1;
                    tracing::debug!(category = %category, name = %file.name, "candidate skipped: duplicate signature");
                }
                Admission::Admitted(id) => {
                    outcome.added += 1;
                    self.enrich(category, id, file).await;
                }
            }
        }

        self.state.lock().await.renumber(category);

        if outcome.added > 0 {
            self.emit(StatusNotice::info(format!(
                "Added {} file{}.",
                outcome.added,
                if outcome.added == 1 { "" } else { "s" }
            )));
        }
        outcome
    }

    /// Admit a remote URL. URLs are not signature-deduplicated; re-adding
    /// the same URL is permitted.
    pub async fn add_url(
        &self,
        category: MediaCategory,
        url: &str,
        kind: Option<UrlKind>,
    ) -> Result<Uuid, IntakeError> {
        let mut state = self.state.lock().await;
        let count = state.items(category).len();

        if let Capacity::Bounded(limit) = self.config.capacity_for(category) {
            if count >= limit {
                let err = IntakeError::CapacityExceeded { category, limit };
                self.emit(StatusNotice::error(err.to_string()));
                return Err(err);
            }
        }
        if !self.config.allows_url(category) {
            let err = IntakeError::UrlNotAllowed(category);
            self.emit(StatusNotice::error(err.to_string()));
            return Err(err);
        }
        let parsed = match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => u,
            _ => {
                let err = IntakeError::InvalidUrl(url.to_string());
                self.emit(StatusNotice::error(err.to_string()));
                return Err(err);
            }
        };

        let item = MediaItem::from_url(category, parsed, kind, count);
        let id = item.id;
        state.items_mut(category).push(item);
        state.renumber(category);
        self.emit(StatusNotice::info("Added 1 URL."));
        Ok(id)
    }

    /// Remove an item by id. Releases its transient handle before the item
    /// is dropped and transfers the primary flag when needed. No-op when
    /// the id is absent.
    pub async fn remove(&self, category: MediaCategory, id: Uuid) -> bool {
        let mut state = self.state.lock().await;

        let removed = {
            let items = state.items_mut(category);
            items
                .iter()
                .position(|i| i.id == id)
                .map(|idx| items.remove(idx))
        };
        let Some(item) = removed else {
            return false;
        };

        if let Some(release) = &item.release {
            release.release();
        }
        state.renumber(category);

        if category == MediaCategory::PrimaryPhotos {
            let items = state.items_mut(category);
            if !items.iter().any(|i| i.primary) {
                if let Some(first) = items.first_mut() {
                    first.primary = true;
                }
            }
        }

        self.emit(StatusNotice::info("Removed item."));
        true
    }

    /// Replace a category's sequence with the given ordering. The id list
    /// must be a permutation of the current items; anything else is
    /// rejected without touching the sequence.
    pub async fn reorder(
        &self,
        category: MediaCategory,
        new_order: &[Uuid],
    ) -> Result<(), IntakeError> {
        let mut state = self.state.lock().await;
        let items = state.items_mut(category);

        let expected = items.len();
        let provided: HashSet<Uuid> = new_order.iter().copied().collect();
        let current: HashSet<Uuid> = items.iter().map(|i| i.id).collect();
        if new_order.len() != expected || provided.len() != new_order.len() || provided != current {
            return Err(IntakeError::InvalidReorder {
                category,
                expected,
                provided: new_order.len(),
            });
        }

        let mut by_id: HashMap<Uuid, MediaItem> = items.drain(..).map(|i| (i.id, i)).collect();
        items.extend(new_order.iter().filter_map(|id| by_id.remove(id)));
        state.renumber(category);
        Ok(())
    }

    /// Flag one primary photo, clearing the flag everywhere else in the
    /// category. Unknown ids are rejected without mutation.
    pub async fn set_primary_photo(&self, id: Uuid) -> Result<(), IntakeError> {
        let mut state = self.state.lock().await;
        let items = state.items_mut(MediaCategory::PrimaryPhotos);
        if !items.iter().any(|i| i.id == id) {
            return Err(IntakeError::ItemNotFound(id));
        }
        for item in items.iter_mut() {
            item.primary = item.id == id;
        }
        Ok(())
    }

    /// Ordered mapping handed to the submission collaborator.
    pub async fn submission_view(&self) -> SubmissionView {
        let state = self.state.lock().await;
        MediaCategory::ALL
            .iter()
            .map(|&category| {
                (
                    category,
                    state.items(category).iter().map(entry_for).collect(),
                )
            })
            .collect()
    }

    /// Admission check and insertion for one candidate, under the state
    /// lock. Locator acquisition happens while the lock is held so the
    /// batch stays consistent; probing does not.
    async fn admit_file(
        &self,
        category: MediaCategory,
        file: &SourceFile,
        capacity: Capacity,
    ) -> Admission {
        let mut state = self.state.lock().await;
        let count = state.items(category).len();

        if capacity.is_reached(count) {
            return Admission::AtCapacity;
        }
        if !category.accepts_mime(&file.content_type) {
            return Admission::SkippedType;
        }
        let signature = file.signature();
        if state.seen_mut(category).contains(&signature) {
            return Admission::SkippedDuplicate;
        }

        let acquired = self.probe.acquire_locator(&file.data, &file.name).await;
        let mut item =
            MediaItem::from_file(category, file, acquired.locator, acquired.release, count);
        if category == MediaCategory::PrimaryPhotos && count == 0 {
            item.primary = true;
        }
        let id = item.id;
        state.items_mut(category).push(item);
        state.seen_mut(category).insert(signature);
        Admission::Admitted(id)
    }

    /// Post-admission enrichment for one item. Runs with the state lock
    /// released; every probe is best-effort and bounded, and the write-back
    /// is a lookup by id.
    async fn enrich(&self, category: MediaCategory, id: Uuid, file: &SourceFile) {
        if !file.is_image() && !file.is_video() {
            return;
        }

        let meta = self.probe.extract_meta(file).await;
        let opts = ThumbnailOptions {
            max_side: self.config.thumbnail_max_side,
            quality: self.config.thumbnail_quality,
            video_seek_seconds: self.config.video_thumbnail_seek_secs,
        };
        let thumbnail = self
            .probe
            .render_thumbnail(&file.data, &file.content_type, &opts)
            .await;

        let mut state = self.state.lock().await;
        apply_enrichment(&mut state, category, id, meta, thumbnail);
    }

    fn emit(&self, notice: StatusNotice) {
        self.status.send_replace(Some(notice));
    }
}
