//! Read-only view handed to the submission collaborator.
//!
//! The downstream uploader serializes this however it likes; this crate
//! only guarantees per-category order and the primary flag.

use std::collections::BTreeMap;

use marina_core::{MediaCategory, MediaItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub name: String,
    /// Scratch path for file items, the external URL for URL items, empty
    /// when the locator is detached.
    pub locator: String,
    pub order: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

pub type SubmissionView = BTreeMap<MediaCategory, Vec<SubmissionEntry>>;

pub(crate) fn entry_for(item: &MediaItem) -> SubmissionEntry {
    SubmissionEntry {
        name: item.name.clone(),
        locator: item.locator.to_string(),
        order: item.order,
        primary: item.primary.then_some(true),
    }
}
