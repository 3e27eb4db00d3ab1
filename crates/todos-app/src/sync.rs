//! Synchronization core: reconciles the local collection with a [`RemoteStore`].
//!
//! Every operation catches store failures, turns them into a single
//! [`ErrorNotice`] and keeps the collection consistent with what the store
//! acknowledged. Only [`TodoSync::rename`] re-raises its failure.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use todos_core::id::{ItemId, OwnerId};
use todos_core::{FilterStatus, Item, ItemPatch, NewItem, normalize_title};
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, ErrorNotice, SyncError};
use crate::remote_store::RemoteStore;
use crate::state::{LoadingMarker, SyncState};

/// Default time an error stays visible, in milliseconds.
pub const DEFAULT_ERROR_DWELL_MS: u64 = 3000;
/// Default time an error stays visible.
pub const DEFAULT_ERROR_DWELL: Duration = Duration::from_millis(DEFAULT_ERROR_DWELL_MS);

/// How a partially failed toggle-all is reconciled.
///
/// `FailFast` is the historical all-or-nothing behavior; `PerItem` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulkTogglePolicy {
    /// Flip exactly the items whose update succeeded.
    #[default]
    PerItem,
    /// Flip nothing on the first failure, then reload from the store.
    FailFast,
}

impl BulkTogglePolicy {
    /// Configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerItem => "per-item",
            Self::FailFast => "fail-fast",
        }
    }
}

impl fmt::Display for BulkTogglePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkTogglePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "per-item" => Ok(Self::PerItem),
            "fail-fast" => Ok(Self::FailFast),
            other => Err(format!("unknown toggle-all policy '{other}'")),
        }
    }
}

/// Tunables for [`TodoSync`].
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Reconciliation policy for toggle-all.
    pub toggle_all: BulkTogglePolicy,
    /// How long an error stays visible before [`TodoSync::expire_error`] clears it.
    pub error_dwell: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            toggle_all: BulkTogglePolicy::default(),
            error_dwell: DEFAULT_ERROR_DWELL,
        }
    }
}

/// Result of a successful [`TodoSync::rename`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The title was updated.
    Renamed,
    /// The trimmed title equals the current one; nothing was sent.
    Unchanged,
    /// The title was blank, so the item was deleted.
    Deleted,
    /// No item with that id exists.
    Missing,
}

/// Owner of the authoritative collection and every mutation on it.
pub struct TodoSync<S> {
    store: S,
    owner: OwnerId,
    options: SyncOptions,
    state: watch::Sender<SyncState>,
    loaded: AtomicBool,
    error_seq: AtomicU64,
}

impl<S> fmt::Debug for TodoSync<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoSync")
            .field("owner", &self.owner)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S> TodoSync<S> {
    /// Build a core scoped to `owner`. Nothing is fetched until [`Self::load`].
    #[must_use]
    pub fn new(store: S, owner: OwnerId, options: SyncOptions) -> Self {
        Self {
            store,
            owner,
            options,
            state: watch::Sender::new(SyncState::default()),
            loaded: AtomicBool::new(false),
            error_seq: AtomicU64::new(0),
        }
    }

    /// Backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Switch the presented subset. Never touches the collection.
    pub fn set_filter(&self, filter: FilterStatus) {
        self.modify_if(|state| {
            if state.filter == filter {
                return false;
            }
            state.filter = filter;
            true
        });
    }

    /// Record an error raised outside the core (e.g. by the presentation layer).
    pub fn report_error(&self, kind: ErrorKind) {
        self.raise(kind);
    }

    /// Clear the current error. Returns `true` when one was visible.
    pub fn dismiss_error(&self) -> bool {
        self.modify_if(|state| state.error.take().is_some())
    }

    /// Clear the current error once its dwell time has elapsed.
    ///
    /// Returns `true` when an error was cleared.
    pub fn expire_error(&self) -> bool {
        let dwell = self.options.error_dwell;
        self.modify_if(|state| match state.error {
            Some(notice) if notice.is_expired(dwell) => {
                state.error = None;
                true
            }
            _ => false,
        })
    }

    fn read<R>(&self, f: impl FnOnce(&SyncState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn modify(&self, f: impl FnOnce(&mut SyncState)) {
        self.state.send_modify(|state| {
            f(state);
            state.version += 1;
        });
    }

    fn modify_if(&self, f: impl FnOnce(&mut SyncState) -> bool) -> bool {
        self.state.send_if_modified(|state| {
            let changed = f(state);
            if changed {
                state.version += 1;
            }
            changed
        })
    }

    fn raise(&self, kind: ErrorKind) {
        let seq = self.error_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let notice = ErrorNotice {
            kind,
            seq,
            raised_at: Instant::now(),
        };
        self.modify(|state| state.error = Some(notice));
    }

    fn acquire(&self, marker: LoadingMarker) {
        self.modify(|state| state.loading = marker);
    }

    /// Clear the marker unless another operation has taken it over meanwhile.
    fn release(&self, marker: LoadingMarker) {
        self.modify_if(|state| {
            if state.loading != marker {
                return false;
            }
            state.loading = LoadingMarker::Idle;
            true
        });
    }
}

impl<S: RemoteStore> TodoSync<S> {
    /// Fetch the collection. Only the first call of a session does anything.
    pub async fn load(&self) {
        if self.loaded.swap(true, Ordering::SeqCst) {
            debug!("Initial load already ran; ignoring");
            return;
        }

        self.acquire(LoadingMarker::Initial);
        debug!(owner = %self.owner, "Loading items");
        match self.store.list(self.owner).await {
            Ok(items) => {
                info!(count = items.len(), "Loaded items");
                self.modify(|state| state.items = items);
            }
            Err(err) => {
                warn!(error = %err, "Failed to load items");
                self.raise(ErrorKind::LoadFailure);
            }
        }
        self.release(LoadingMarker::Initial);
    }

    /// Create an item from user input.
    ///
    /// Returns the persisted item, or `None` when validation or the store
    /// failed (the error state says which).
    pub async fn create(&self, raw_title: &str) -> Option<Item> {
        let Ok(new_item) = NewItem::new(self.owner, raw_title) else {
            debug!("Rejected blank title");
            self.raise(ErrorKind::ValidationFailure);
            return None;
        };

        let marker = LoadingMarker::Item(ItemId::PLACEHOLDER);
        let placeholder = Item::placeholder(self.owner, new_item.title.clone());
        self.modify(|state| {
            state.pending = Some(placeholder);
            state.loading = marker;
        });

        debug!(title = %new_item.title, "Creating item");
        let created = match self.store.create(&new_item).await {
            Ok(item) => {
                info!(id = %item.id, "Created item");
                let appended = item.clone();
                self.modify(|state| {
                    state.pending = None;
                    state.items.push(appended);
                });
                Some(item)
            }
            Err(err) => {
                warn!(error = %err, "Failed to create item");
                self.modify(|state| state.pending = None);
                self.raise(ErrorKind::AddFailure);
                None
            }
        };
        self.release(marker);
        created
    }

    /// Flip the completion flag of one item. Unknown ids are ignored.
    pub async fn toggle(&self, id: ItemId) {
        let Some(current) = self.read(|state| state.item(id).map(|item| item.completed)) else {
            debug!(%id, "Toggle ignored for unknown item");
            return;
        };

        let marker = LoadingMarker::Item(id);
        self.acquire(marker);
        let target = !current;
        debug!(%id, completed = target, "Updating completion");
        match self.store.update(id, &ItemPatch::completed(target)).await {
            Ok(_) => {
                info!(%id, completed = target, "Updated completion");
                self.set_completed(&[id], target);
            }
            Err(err) => {
                warn!(%id, error = %err, "Failed to update completion");
                self.raise(ErrorKind::UpdateFailure);
            }
        }
        self.release(marker);
    }

    /// Complete every item, or reopen all of them when all are completed.
    pub async fn toggle_all(&self) {
        let (target, selected) = self.read(|state| {
            let target = !state.items.iter().all(|item| item.completed);
            let selected: Vec<ItemId> = state
                .items
                .iter()
                .filter(|item| item.completed != target)
                .map(|item| item.id)
                .collect();
            (target, selected)
        });
        let Some(&first) = selected.first() else {
            return;
        };

        let marker = LoadingMarker::Item(first);
        self.acquire(marker);
        debug!(count = selected.len(), completed = target, policy = %self.options.toggle_all, "Toggling all items");
        let patch = ItemPatch::completed(target);
        match self.options.toggle_all {
            BulkTogglePolicy::PerItem => self.toggle_each(&selected, &patch, target).await,
            BulkTogglePolicy::FailFast => self.toggle_together(&selected, &patch, target).await,
        }
        self.release(marker);
    }

    async fn toggle_each(&self, selected: &[ItemId], patch: &ItemPatch, target: bool) {
        let results = join_all(selected.iter().map(|&id| async move {
            (id, self.store.update(id, patch).await)
        }))
        .await;

        let mut succeeded = Vec::with_capacity(results.len());
        let mut failures = 0_usize;
        for (id, result) in results {
            match result {
                Ok(_) => succeeded.push(id),
                Err(err) => {
                    warn!(%id, error = %err, "Failed to update completion");
                    failures += 1;
                }
            }
        }

        self.set_completed(&succeeded, target);
        if failures > 0 {
            self.raise(ErrorKind::UpdateFailure);
        } else {
            info!(count = succeeded.len(), completed = target, "Toggled all items");
        }
    }

    async fn toggle_together(&self, selected: &[ItemId], patch: &ItemPatch, target: bool) {
        let outcome = try_join_all(selected.iter().map(|&id| self.store.update(id, patch))).await;
        match outcome {
            Ok(_) => {
                info!(count = selected.len(), completed = target, "Toggled all items");
                self.set_completed(selected, target);
            }
            Err(err) => {
                warn!(error = %err, "Toggle-all aborted; reloading");
                self.raise(ErrorKind::UpdateFailure);
                self.reconcile().await;
            }
        }
    }

    /// Replace the collection with the store's view, keeping it on failure.
    async fn reconcile(&self) {
        match self.store.list(self.owner).await {
            Ok(items) => {
                info!(count = items.len(), "Reloaded items");
                self.modify(|state| state.items = items);
            }
            Err(err) => warn!(error = %err, "Reload failed; keeping local items"),
        }
    }

    /// Delete one item. Failures leave the collection untouched.
    pub async fn remove(&self, id: ItemId) {
        let _ = self.delete_item(id).await;
    }

    /// Delete every completed item, one request at a time.
    ///
    /// Items whose delete failed stay in place.
    pub async fn clear_completed(&self) {
        let selected: Vec<ItemId> = self.read(|state| {
            state
                .items
                .iter()
                .filter(|item| item.completed)
                .map(|item| item.id)
                .collect()
        });
        let Some(&first) = selected.first() else {
            return;
        };

        let marker = LoadingMarker::Item(first);
        self.acquire(marker);
        let mut deleted = HashSet::with_capacity(selected.len());
        for id in selected {
            debug!(%id, "Deleting completed item");
            match self.store.delete(id).await {
                Ok(()) => {
                    deleted.insert(id);
                }
                Err(err) => {
                    warn!(%id, error = %err, "Failed to delete item");
                    self.raise(ErrorKind::DeleteFailure);
                }
            }
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "Cleared completed items");
            self.modify(|state| state.items.retain(|item| !deleted.contains(&item.id)));
        }
        self.release(marker);
    }

    /// Rename an item; a blank title deletes it instead.
    ///
    /// # Errors
    /// Returns the store failure (after recording it in the error state) when
    /// the update or the fallback delete fails.
    pub async fn rename(&self, id: ItemId, raw_title: &str) -> Result<RenameOutcome, SyncError> {
        let Some(current) = self.read(|state| state.item(id).map(|item| item.title.clone())) else {
            debug!(%id, "Rename ignored for unknown item");
            return Ok(RenameOutcome::Missing);
        };

        let Some(title) = normalize_title(raw_title) else {
            return self.delete_item(id).await.map(|()| RenameOutcome::Deleted);
        };
        if title == current {
            return Ok(RenameOutcome::Unchanged);
        }

        let marker = LoadingMarker::Item(id);
        self.acquire(marker);
        debug!(%id, %title, "Renaming item");
        let result = match self.store.update(id, &ItemPatch::title(title)).await {
            Ok(_) => {
                info!(%id, "Renamed item");
                self.modify(|state| {
                    if let Some(item) = state.items.iter_mut().find(|item| item.id == id) {
                        title.clone_into(&mut item.title);
                    }
                });
                Ok(RenameOutcome::Renamed)
            }
            Err(err) => {
                warn!(%id, error = %err, "Failed to rename item");
                self.raise(ErrorKind::UpdateFailure);
                Err(SyncError::new(ErrorKind::UpdateFailure, err))
            }
        };
        self.release(marker);
        result
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), SyncError> {
        let marker = LoadingMarker::Item(id);
        self.acquire(marker);
        debug!(%id, "Deleting item");
        let result = match self.store.delete(id).await {
            Ok(()) => {
                info!(%id, "Deleted item");
                self.modify(|state| state.items.retain(|item| item.id != id));
                Ok(())
            }
            Err(err) => {
                warn!(%id, error = %err, "Failed to delete item");
                self.raise(ErrorKind::DeleteFailure);
                Err(SyncError::new(ErrorKind::DeleteFailure, err))
            }
        };
        self.release(marker);
        result
    }

    fn set_completed(&self, ids: &[ItemId], completed: bool) {
        if ids.is_empty() {
            return;
        }
        self.modify(|state| {
            for item in &mut state.items {
                if ids.contains(&item.id) {
                    item.completed = completed;
                }
            }
        });
    }
}
