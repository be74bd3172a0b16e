//! Client side of the RTSP-to-HLS relay backend.
//!
//! The backend exposes a small JSON API:
//!
//! | Method | Path | Body | Purpose |
//! |--------|------|------|---------|
//! | GET | `/list` | |  Known streams |
//! | POST | `/start` | `{ "uri", "alias"? }` | Start transcoding a source |
//!
//! Playlists are then served under `/stream/<slug>/index.m3u8`.
//!
//! [`BackendGateway`] is the seam the controller talks through.
//! [`HttpGateway`] is the real implementation; tests substitute their own.

pub mod http;
pub mod normalize;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::StreamEntry;

pub use http::HttpGateway;

/// Translation layer between the catalog and the relay backend.
///
/// Implementations hold no catalog state. Every call is one request and its
/// response normalized into [`StreamEntry`] values with absolute URLs.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Absolute base URL relative references are resolved against.
    fn base_url(&self) -> &str;

    /// Fetch the full listing of known streams, in backend order.
    async fn list_streams(&self) -> Result<Vec<StreamEntry>>;

    /// Ask the backend to start relaying `uri`, optionally under `alias`.
    ///
    /// Fails with [`Validation`](crate::CatalogError::Validation) on an empty
    /// `uri` without contacting the backend.
    async fn start_stream_with_alias(
        &self,
        uri: &str,
        alias: Option<&str>,
    ) -> Result<StreamEntry>;

    async fn start_stream(&self, uri: &str) -> Result<StreamEntry> {
        self.start_stream_with_alias(uri, None).await
    }

    /// Turn a relative or absolute playlist reference into an absolute URL.
    fn resolve_playback_url(&self, reference: &str) -> Result<String> {
        normalize::resolve_url(self.base_url(), reference)
    }
}
