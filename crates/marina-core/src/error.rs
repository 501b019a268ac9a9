//! Error types for the intake pipeline.
//!
//! Only admission-policy failures are represented here: capacity, URL
//! admission, and structural mutation errors. Probe and decode failures are
//! never errors — they degrade an item to absent optional fields.
//!
//! The `Display` strings double as the user-facing status messages emitted
//! on the collection manager's status channel.

use uuid::Uuid;

use crate::category::MediaCategory;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Limit reached ({limit}).")]
    CapacityExceeded {
        category: MediaCategory,
        limit: usize,
    },

    #[error("URLs are not allowed for this section.")]
    UrlNotAllowed(MediaCategory),

    #[error("Please enter a valid URL (http/https).")]
    InvalidUrl(String),

    #[error("No media item with id {0}")]
    ItemNotFound(Uuid),

    #[error("Reorder of {category} must keep the same {expected} item(s); {provided} id(s) provided")]
    InvalidReorder {
        category: MediaCategory,
        expected: usize,
        provided: usize,
    },
}

impl IntakeError {
    /// Short machine-readable code, mirrors the variant.
    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            IntakeError::UrlNotAllowed(_) => "URL_NOT_ALLOWED",
            IntakeError::InvalidUrl(_) => "INVALID_URL",
            IntakeError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            IntakeError::InvalidReorder { .. } => "INVALID_REORDER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_carries_limit() {
        let err = IntakeError::CapacityExceeded {
            category: MediaCategory::Videos,
            limit: 5,
        };
        assert_eq!(err.to_string(), "Limit reached (5).");
        assert_eq!(err.code(), "CAPACITY_EXCEEDED");
    }

    #[test]
    fn test_url_messages() {
        assert_eq!(
            IntakeError::UrlNotAllowed(MediaCategory::Documents).to_string(),
            "URLs are not allowed for this section."
        );
        assert_eq!(
            IntakeError::InvalidUrl("not a url".into()).to_string(),
            "Please enter a valid URL (http/https)."
        );
    }

    #[test]
    fn test_reorder_message() {
        let err = IntakeError::InvalidReorder {
            category: MediaCategory::Videos,
            expected: 2,
            provided: 3,
        };
        assert!(err.to_string().contains("videos"));
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('3'));
    }
}
