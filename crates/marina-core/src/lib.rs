//! Marina core library
//!
//! Domain models shared by the media intake pipeline: the category
//! enumeration and its admission rules, capacity accounting, candidate and
//! admitted media types, error types, and the intake configuration surface.
//! This crate performs no I/O; probing and collection management live in
//! `marina-probe` and `marina-intake`.

pub mod category;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use category::{Capacity, MediaCategory};
pub use config::{IntakeConfig, ProbeConfig};
pub use error::IntakeError;
pub use models::{MediaItem, MediaLocator, ReleaseHandle, Signature, SourceFile, UrlKind};
