use std::collections::HashMap;

use todos_app::SyncState;
use todos_core::id::ItemId;
use todos_core::{FilterStatus, Item};

/// Filtered view of the collection plus the selection, independent of IO.
///
/// Rebuilt only when the state version or the filter changes.
#[derive(Debug, Default)]
pub(super) struct VisibleItems {
    key: Option<(u64, FilterStatus)>,
    visible: Vec<usize>,
    visible_index: HashMap<ItemId, usize>,
    selected: usize,
}

#[allow(clippy::missing_const_for_fn)]
impl VisibleItems {
    /// Rebuild from `state` when it changed. Returns `true` when rebuilt.
    ///
    /// `preferred` keeps the selection on that item when it is still visible.
    pub(super) fn rebuild(&mut self, state: &SyncState, preferred: Option<ItemId>) -> bool {
        let key = (state.version, state.filter);
        if self.key == Some(key) {
            return false;
        }
        self.key = Some(key);
        self.visible.clear();
        self.visible_index.clear();

        for (idx, item) in state.items.iter().enumerate() {
            if state.filter.matches(item) {
                self.visible_index.insert(item.id, self.visible.len());
                self.visible.push(idx);
            }
        }

        self.selected = self.resolve_selection(preferred);
        true
    }

    fn resolve_selection(&self, preferred: Option<ItemId>) -> usize {
        if self.visible.is_empty() {
            return 0;
        }
        if let Some(id) = preferred
            && let Some(&index) = self.visible_index.get(&id)
        {
            return index;
        }
        self.selected.min(self.visible.len() - 1)
    }

    pub(super) fn has_visible_items(&self) -> bool {
        !self.visible.is_empty()
    }

    pub(super) fn visible_items<'a>(&'a self, items: &'a [Item]) -> impl Iterator<Item = &'a Item> + 'a {
        self.visible.iter().filter_map(move |&idx| items.get(idx))
    }

    pub(super) fn selected_index(&self) -> usize {
        self.selected
    }

    pub(super) fn selected_item<'a>(&self, items: &'a [Item]) -> Option<&'a Item> {
        self.visible.get(self.selected).and_then(|&idx| items.get(idx))
    }

    pub(super) fn selected_item_id(&self, items: &[Item]) -> Option<ItemId> {
        self.selected_item(items).map(|item| item.id)
    }

    pub(super) fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub(super) fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(super) fn jump_to_item(&mut self, id: ItemId) -> bool {
        self.visible_index.get(&id).copied().is_some_and(|index| {
            self.selected = index;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todos_core::id::OwnerId;

    fn item(id: u64, completed: bool) -> Item {
        Item {
            id: ItemId(id),
            owner_id: OwnerId::new(1).unwrap_or_else(|| unreachable!("non-zero literal")),
            title: format!("item {id}"),
            completed,
        }
    }

    fn state(items: Vec<Item>, filter: FilterStatus, version: u64) -> SyncState {
        SyncState {
            items,
            filter,
            version,
            ..SyncState::default()
        }
    }

    fn visible_ids(visible: &VisibleItems, state: &SyncState) -> Vec<u64> {
        visible.visible_items(&state.items).map(|item| item.id.0).collect()
    }

    #[test]
    fn rebuild_applies_filter() {
        let state = state(vec![item(1, true), item(2, false), item(3, true)], FilterStatus::Completed, 1);
        let mut visible = VisibleItems::default();

        assert!(visible.rebuild(&state, None));
        assert_eq!(visible_ids(&visible, &state), vec![1, 3]);
    }

    #[test]
    fn rebuild_is_skipped_for_same_version_and_filter() {
        let first = state(vec![item(1, false)], FilterStatus::All, 4);
        let mut visible = VisibleItems::default();
        assert!(visible.rebuild(&first, None));

        let same_key = state(vec![item(1, false), item(2, false)], FilterStatus::All, 4);
        assert!(!visible.rebuild(&same_key, None));
        assert_eq!(visible_ids(&visible, &first), vec![1]);

        let refiltered = state(vec![item(1, false)], FilterStatus::Completed, 4);
        assert!(visible.rebuild(&refiltered, None));
        assert!(!visible.has_visible_items());
    }

    #[test]
    fn selection_follows_preferred_item() {
        let before = state(vec![item(1, false), item(2, false), item(3, false)], FilterStatus::All, 1);
        let mut visible = VisibleItems::default();
        visible.rebuild(&before, None);
        visible.select_next();
        visible.select_next();
        assert_eq!(visible.selected_item_id(&before.items), Some(ItemId(3)));

        let after = state(vec![item(3, false), item(4, false)], FilterStatus::All, 2);
        visible.rebuild(&after, Some(ItemId(3)));
        assert_eq!(visible.selected_index(), 0);
    }

    #[test]
    fn selection_is_clamped_when_items_disappear() {
        let before = state(vec![item(1, false), item(2, false), item(3, false)], FilterStatus::All, 1);
        let mut visible = VisibleItems::default();
        visible.rebuild(&before, None);
        visible.select_next();
        visible.select_next();
        visible.select_next();
        assert_eq!(visible.selected_index(), 2);

        let after = state(vec![item(1, false)], FilterStatus::All, 2);
        visible.rebuild(&after, Some(ItemId(3)));
        assert_eq!(visible.selected_item_id(&after.items), Some(ItemId(1)));

        visible.select_prev();
        assert_eq!(visible.selected_index(), 0);
    }

    #[test]
    fn jump_to_item_only_targets_visible_items() {
        let state = state(vec![item(1, true), item(2, false)], FilterStatus::Active, 1);
        let mut visible = VisibleItems::default();
        visible.rebuild(&state, None);

        assert!(!visible.jump_to_item(ItemId(1)));
        assert!(visible.jump_to_item(ItemId(2)));
        assert_eq!(visible.selected_item_id(&state.items), Some(ItemId(2)));
    }
}
