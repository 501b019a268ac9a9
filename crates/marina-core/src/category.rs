//! Media categories and their admission rules.
//!
//! Each draft listing keeps one ordered collection per category. A category
//! determines which MIME types may be admitted as files, whether remote URLs
//! may be admitted, and how many items the collection holds by default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media category enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaCategory {
    PrimaryPhotos,
    VirtualTours,
    Videos,
    Drone,
    FloorPlans,
    Documents,
    Additional,
}

impl MediaCategory {
    /// All categories, in presentation order.
    pub const ALL: [MediaCategory; 7] = [
        MediaCategory::PrimaryPhotos,
        MediaCategory::VirtualTours,
        MediaCategory::Videos,
        MediaCategory::Drone,
        MediaCategory::FloorPlans,
        MediaCategory::Documents,
        MediaCategory::Additional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::PrimaryPhotos => "primaryPhotos",
            MediaCategory::VirtualTours => "virtualTours",
            MediaCategory::Videos => "videos",
            MediaCategory::Drone => "drone",
            MediaCategory::FloorPlans => "floorPlans",
            MediaCategory::Documents => "documents",
            MediaCategory::Additional => "additional",
        }
    }

    /// Default item limit for this category.
    pub fn default_capacity(&self) -> Capacity {
        match self {
            MediaCategory::PrimaryPhotos => Capacity::Bounded(15),
            MediaCategory::VirtualTours => Capacity::Bounded(5),
            MediaCategory::Videos => Capacity::Bounded(5),
            MediaCategory::Drone => Capacity::Bounded(10),
            MediaCategory::FloorPlans => Capacity::Bounded(10),
            MediaCategory::Documents => Capacity::Bounded(20),
            MediaCategory::Additional => Capacity::Bounded(20),
        }
    }

    /// Whether a file with the given content type may be admitted into this
    /// category. Matching is case-insensitive. Virtual tours accept no files
    /// at all (URL-only category).
    pub fn accepts_mime(&self, content_type: &str) -> bool {
        let t = content_type.to_ascii_lowercase();
        match self {
            MediaCategory::PrimaryPhotos => t.starts_with("image/"),
            MediaCategory::VirtualTours => false,
            MediaCategory::Videos => t.starts_with("video/"),
            MediaCategory::Drone => t.starts_with("image/") || t.starts_with("video/"),
            MediaCategory::FloorPlans => t == "application/pdf" || t.starts_with("image/"),
            MediaCategory::Documents => t == "application/pdf",
            MediaCategory::Additional => t.starts_with("image/") || t == "application/pdf",
        }
    }

    /// Whether remote URLs may be admitted into this category by default.
    pub fn allows_url_by_default(&self) -> bool {
        matches!(
            self,
            MediaCategory::VirtualTours | MediaCategory::Videos | MediaCategory::Additional
        )
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item limit for a category collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Capacity {
    /// The concrete limit, if any.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Bounded(limit) => Some(*limit),
            Capacity::Unbounded => None,
        }
    }

    /// Whether a collection holding `current` items is at or over the limit.
    pub fn is_reached(&self, current: usize) -> bool {
        match self {
            Capacity::Bounded(limit) => current >= *limit,
            Capacity::Unbounded => false,
        }
    }

    /// Room left for a collection holding `current` items. Unbounded
    /// capacities stay unbounded.
    pub fn remaining(&self, current: usize) -> Capacity {
        match self {
            Capacity::Bounded(limit) => Capacity::Bounded(limit.saturating_sub(current)),
            Capacity::Unbounded => Capacity::Unbounded,
        }
    }
}
