//! Observable session state owned by [`TodoSync`](crate::TodoSync).

use todos_core::id::ItemId;
use todos_core::{FilterStatus, Item, ItemStats, filter_items};

use crate::error::{ErrorKind, ErrorNotice};

/// Which operation is in flight, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadingMarker {
    /// Nothing in flight.
    #[default]
    Idle,
    /// The initial full load.
    Initial,
    /// A mutation targeting this item (the placeholder id while creating).
    Item(ItemId),
}

impl LoadingMarker {
    /// Whether the marker names `id`.
    #[must_use]
    pub fn targets(self, id: ItemId) -> bool {
        self == Self::Item(id)
    }

    /// Whether any operation holds the marker.
    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Everything the presentation layer renders from.
///
/// `version` increases with every change so derived views can be cached.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Authoritative collection, in server order.
    pub items: Vec<Item>,
    /// Placeholder shown while a create is in flight; never part of `items`.
    pub pending: Option<Item>,
    /// In-flight operation marker.
    pub loading: LoadingMarker,
    /// Current error, if any.
    pub error: Option<ErrorNotice>,
    /// Active projection of `items`.
    pub filter: FilterStatus,
    /// Change counter.
    pub version: u64,
}

impl SyncState {
    /// Items passing the current filter, in collection order.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> + '_ {
        filter_items(&self.items, self.filter)
    }

    /// Derived counters.
    #[must_use]
    pub fn stats(&self) -> ItemStats {
        ItemStats::from_items(&self.items)
    }

    /// Look up an item of the authoritative collection.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The initial load is running.
    #[must_use]
    pub fn is_initial_loading(&self) -> bool {
        self.loading == LoadingMarker::Initial
    }

    /// A mutation on `id` is running.
    #[must_use]
    pub fn is_loading(&self, id: ItemId) -> bool {
        self.loading.targets(id)
    }

    /// Any operation is running.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.loading.is_set()
    }

    /// Kind of the current error.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.map(|notice| notice.kind)
    }
}
