use crossterm::event::{KeyEvent, KeyEventKind};

use super::view::{Mode, Ui, UiAction};

pub(super) mod editing;
pub(super) mod events;
pub(super) mod navigation;

impl Ui {
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match self.mode {
            Mode::Browse => self.handle_item_list_key(key),
            Mode::Input => self.handle_input_key(key),
            Mode::Rename(id) => self.handle_rename_key(id, key),
        }
    }
}
