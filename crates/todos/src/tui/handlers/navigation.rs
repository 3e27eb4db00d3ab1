use crossterm::event::KeyEvent;
use todos_core::FilterStatus;
use todos_core::id::ItemId;

use super::super::text_field::TextField;
use super::super::view::{Mode, Ui, UiAction};
use crate::config::Action;

impl Ui {
    pub(in crate::tui) fn handle_item_list_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        let bindings = &self.keybindings;

        if bindings.matches(Action::Quit, &key) {
            self.should_quit = true;
            return None;
        }

        if bindings.matches(Action::Down, &key) {
            self.visible.select_next();
            return None;
        }

        if bindings.matches(Action::Up, &key) {
            self.visible.select_prev();
            return None;
        }

        if bindings.matches(Action::NewItem, &key) {
            self.mode = Mode::Input;
            return None;
        }

        if bindings.matches(Action::Toggle, &key) {
            return self.idle_selection().map(|id| UiAction::Toggle { id });
        }

        if bindings.matches(Action::ToggleAll, &key) {
            return self.shows_toggle_all().then_some(UiAction::ToggleAll);
        }

        if bindings.matches(Action::Edit, &key) {
            self.open_rename_editor();
            return None;
        }

        if bindings.matches(Action::Delete, &key) {
            return self.idle_selection().map(|id| UiAction::Remove { id });
        }

        if bindings.matches(Action::ClearCompleted, &key) {
            return self
                .state
                .stats()
                .has_completed()
                .then_some(UiAction::ClearCompleted);
        }

        if bindings.matches(Action::NextFilter, &key) {
            return Some(UiAction::SetFilter(self.state.filter.next()));
        }

        let filter = if bindings.matches(Action::ShowAll, &key) {
            Some(FilterStatus::All)
        } else if bindings.matches(Action::ShowActive, &key) {
            Some(FilterStatus::Active)
        } else if bindings.matches(Action::ShowCompleted, &key) {
            Some(FilterStatus::Completed)
        } else {
            None
        };
        if let Some(filter) = filter {
            return (filter != self.state.filter).then_some(UiAction::SetFilter(filter));
        }

        if bindings.matches(Action::DismissError, &key) {
            if self.state.error.is_some() {
                return Some(UiAction::DismissError);
            }
            self.message = None;
        }

        None
    }

    /// Selected item, unless an operation currently targets it.
    fn idle_selection(&self) -> Option<ItemId> {
        self.selected_item_id()
            .filter(|id| !id.is_placeholder() && !self.state.is_loading(*id))
    }

    pub(in crate::tui) fn open_rename_editor(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let id = item.id;
        if id.is_placeholder() || self.state.is_loading(id) {
            self.error("This item is busy; try again once it settles");
            return;
        }
        let title = item.title.clone();
        self.drafts.entry(id).or_insert_with(|| TextField::with_text(title));
        self.mode = Mode::Rename(id);
    }
}
