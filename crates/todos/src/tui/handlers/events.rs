use todos_app::RenameOutcome;

use super::super::view::{Mode, Ui, UiEvent};

impl Ui {
    /// React to a finished operation. State changes already arrived through
    /// [`Ui::apply_state`]; this only updates editor bookkeeping.
    pub(in crate::tui) fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Created(created) => {
                self.creating = false;
                if let Some(item) = created {
                    self.input.clear();
                    self.visible.jump_to_item(item.id);
                }
            }
            UiEvent::Renamed { id, result } => {
                if self.renaming != Some(id) {
                    // The editor was cancelled while the request ran.
                    return;
                }
                self.renaming = None;
                match result {
                    Ok(outcome) => {
                        self.drafts.remove(&id);
                        if self.mode == Mode::Rename(id) {
                            self.mode = Mode::Browse;
                        }
                        match outcome {
                            RenameOutcome::Unchanged => self.info("Title unchanged"),
                            RenameOutcome::Missing => self.error("The item no longer exists"),
                            RenameOutcome::Renamed | RenameOutcome::Deleted => {}
                        }
                    }
                    // The error banner explains the failure; the draft stays for another try.
                    Err(_) => {
                        if self.drafts.contains_key(&id) {
                            self.mode = Mode::Rename(id);
                        }
                    }
                }
            }
        }
    }
}
