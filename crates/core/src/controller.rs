//! User-intent handlers over the catalog.
//!
//! [`PlaybackController`] is the only thing a front end talks to. It owns
//! the [`CatalogStore`] behind a mutex, calls the injected
//! [`BackendGateway`] for anything that needs the network, and publishes a
//! [`CatalogSnapshot`] on a `watch` channel whenever the observable state
//! changes.
//!
//! Gateway calls are the only suspension points. The store lock is taken
//! after a response arrives and released before returning, so it is never
//! held across an `.await`.
//!
//! ## Initial load vs. early adds
//!
//! The first `/list` and a user's first `/start` are independent requests.
//! If the start answer lands first, the entry is remembered; when the
//! listing arrives it replaces the catalog and any remembered entry missing
//! from it is appended again under the normal append rules. Later loads are
//! plain snapshots.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{CatalogError, Result};
use crate::gateway::BackendGateway;
use crate::model::{RenderTarget, StreamEntry};
use crate::store::{CatalogStore, SelectionState};

/// Point-in-time view of the catalog, as handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub entries: Vec<StreamEntry>,
    pub selection: Option<usize>,
    pub render_target: RenderTarget,
    /// Bumped on every published change.
    pub revision: u64,
}

impl CatalogSnapshot {
    fn of(store: &CatalogStore, revision: u64) -> Self {
        Self {
            entries: store.entries().to_vec(),
            selection: store.selection(),
            render_target: store.render_target(),
            revision,
        }
    }
}

struct Inner {
    store: CatalogStore,
    loaded: bool,
    /// Entries appended before the first listing resolved.
    early_appends: Vec<StreamEntry>,
    revision: u64,
}

/// Cloneable handle driving one catalog session.
#[derive(Clone)]
pub struct PlaybackController {
    gateway: Arc<dyn BackendGateway>,
    inner: Arc<Mutex<Inner>>,
    updates: Arc<watch::Sender<CatalogSnapshot>>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PlaybackController")
            .field("base_url", &self.gateway.base_url())
            .field("streams", &inner.store.len())
            .field("selection", &inner.store.selection())
            .field("loaded", &inner.loaded)
            .finish()
    }
}

impl PlaybackController {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        let store = CatalogStore::new();
        let (updates, _) = watch::channel(CatalogSnapshot::of(&store, 0));
        Self {
            gateway,
            inner: Arc::new(Mutex::new(Inner {
                store,
                loaded: false,
                early_appends: Vec::new(),
                revision: 0,
            })),
            updates: Arc::new(updates),
        }
    }

    /// Fetch the listing and make it the catalog.
    ///
    /// On failure the catalog is left as it was.
    pub async fn load(&self) -> Result<()> {
        let entries = self
            .gateway
            .list_streams()
            .await
            .inspect_err(|e| report("load", e))?;

        let mut inner = self.inner.lock();
        inner.store.replace_all(entries);

        if !inner.loaded {
            inner.loaded = true;
            let early = std::mem::take(&mut inner.early_appends);
            for entry in early {
                if !inner.store.contains(&entry.id) {
                    tracing::info!(id = %entry.id, "keeping stream added before listing arrived");
                    inner.store.append(entry);
                }
            }
        }

        self.publish(&mut inner);
        Ok(())
    }

    /// Start relaying `raw_uri` and add the result to the catalog.
    ///
    /// Returns the index of the new (or already known) entry.
    pub async fn on_add_stream(&self, raw_uri: &str) -> Result<usize> {
        self.on_add_stream_with_alias(raw_uri, None).await
    }

    pub async fn on_add_stream_with_alias(
        &self,
        raw_uri: &str,
        alias: Option<&str>,
    ) -> Result<usize> {
        let uri = raw_uri.trim();
        if uri.is_empty() {
            let err = CatalogError::validation("stream URI is empty");
            report("add", &err);
            return Err(err);
        }

        let entry = self
            .gateway
            .start_stream_with_alias(uri, alias)
            .await
            .inspect_err(|e| report("add", e))?;

        let mut inner = self.inner.lock();
        if !inner.loaded {
            inner.early_appends.push(entry.clone());
        }

        let before = (inner.store.len(), inner.store.selection());
        let index = inner.store.append(entry);
        if (inner.store.len(), inner.store.selection()) != before {
            self.publish(&mut inner);
        }
        Ok(index)
    }

    /// Make the entry at `index` the playback target.
    ///
    /// A stale index is reported as [`CatalogError::OutOfRange`] and changes
    /// nothing.
    pub fn on_select_stream(&self, index: usize) -> Result<()> {
        let mut inner = self.inner.lock();
        let before = inner.store.selection();
        inner
            .store
            .select(index)
            .inspect_err(|e| report("select", e))?;
        if inner.store.selection() != before {
            self.publish(&mut inner);
        }
        Ok(())
    }

    /// What the external player should show right now.
    pub fn render_target(&self) -> RenderTarget {
        self.inner.lock().store.render_target()
    }

    pub fn current_entry(&self) -> Option<StreamEntry> {
        self.inner.lock().store.current_entry().cloned()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.inner.lock().store.state()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let inner = self.inner.lock();
        CatalogSnapshot::of(&inner.store, inner.revision)
    }

    /// Whether the first listing has been applied.
    pub fn is_loaded(&self) -> bool {
        self.inner.lock().loaded
    }

    /// Receive a new [`CatalogSnapshot`] after every observable change.
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.updates.subscribe()
    }

    pub fn gateway(&self) -> &Arc<dyn BackendGateway> {
        &self.gateway
    }

    fn publish(&self, inner: &mut Inner) {
        inner.revision += 1;
        let snapshot = CatalogSnapshot::of(&inner.store, inner.revision);
        tracing::debug!(
            revision = snapshot.revision,
            streams = snapshot.entries.len(),
            target = ?snapshot.render_target,
            "catalog updated"
        );
        self.updates.send_replace(snapshot);
    }
}

/// Log a failed intent. Format errors get their own level so they stand
/// out from ordinary network trouble.
fn report(op: &'static str, err: &CatalogError) {
    match err {
        CatalogError::Format(_) => {
            tracing::error!(op, kind = err.kind(), error = %err, "backend response not understood");
        }
        CatalogError::Transport { .. } | CatalogError::Conflict(_) => {
            tracing::warn!(op, kind = err.kind(), error = %err, "backend request failed");
        }
        _ => tracing::debug!(op, kind = err.kind(), error = %err, "request rejected"),
    }
}
