//! Marina intake - the collection manager
//!
//! Owns the per-listing media collections: admission of files and URLs
//! against per-category capacity, MIME and URL-admission rules, exact
//! signature dedup, dense ordering, the primary-photo invariant, and the
//! single-slot status channel consumed by the caller's UI layer.
//!
//! The manager is the sole mutator of item placement. Enrichment
//! (dimensions, duration, thumbnail) runs after insertion with the state
//! lock released and writes back by id, so results for an item removed in
//! the meantime are dropped rather than resurrected.

pub mod manager;
pub mod status;
pub mod submission;

pub use manager::{AddOutcome, CollectionManager};
pub use status::{StatusKind, StatusNotice};
pub use submission::{SubmissionEntry, SubmissionView};
