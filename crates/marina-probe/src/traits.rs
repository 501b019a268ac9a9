//! Probe trait - unified interface over per-kind metadata probes.

use async_trait::async_trait;

/// Best-effort metadata probe for one media kind.
///
/// Implementations never error: undecodable input probes as `None`.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    type Output: Send + Sync;

    async fn probe(&self, data: &[u8]) -> Option<Self::Output>;
}
