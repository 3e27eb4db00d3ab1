use crossterm::event::{KeyCode, KeyEvent};
use todos_core::id::ItemId;

use super::super::view::{Mode, Ui, UiAction};

impl Ui {
    pub(in crate::tui) fn handle_input_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Esc | KeyCode::Down | KeyCode::Tab => {
                self.mode = Mode::Browse;
                None
            }
            KeyCode::Enter if !self.input_read_only() => {
                self.creating = true;
                Some(UiAction::Create {
                    title: self.input.text().to_owned(),
                })
            }
            _ => {
                if !self.input_read_only() {
                    self.input.handle_key(&key);
                }
                None
            }
        }
    }

    pub(in crate::tui) fn handle_rename_key(&mut self, id: ItemId, key: KeyEvent) -> Option<UiAction> {
        if key.code == KeyCode::Esc {
            self.close_rename_editor(id);
            return None;
        }
        if self.renaming == Some(id) {
            return None;
        }

        match key.code {
            KeyCode::Enter => self.submit_rename(id),
            KeyCode::Up => {
                let action = self.submit_rename(id);
                self.visible.select_prev();
                action
            }
            KeyCode::Down => {
                let action = self.submit_rename(id);
                self.visible.select_next();
                action
            }
            _ => {
                if let Some(draft) = self.drafts.get_mut(&id) {
                    draft.handle_key(&key);
                }
                None
            }
        }
    }

    fn submit_rename(&mut self, id: ItemId) -> Option<UiAction> {
        let title = self.drafts.get(&id)?.text().to_owned();
        self.renaming = Some(id);
        Some(UiAction::Rename { id, title })
    }

    /// Drop the draft and leave the editor without saving.
    pub(in crate::tui) fn close_rename_editor(&mut self, id: ItemId) {
        self.drafts.remove(&id);
        if self.renaming == Some(id) {
            self.renaming = None;
        }
        if self.mode == Mode::Rename(id) {
            self.mode = Mode::Browse;
        }
    }
}
