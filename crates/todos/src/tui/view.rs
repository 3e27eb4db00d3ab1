use std::collections::HashMap;
use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
};
use todos_app::{ErrorKind, RenameOutcome, SyncState};
use todos_core::id::ItemId;
use todos_core::{FilterStatus, Item};

use super::constants::UI_MESSAGE_TTL_SECS;
use super::text_field::TextField;
use super::visible_items::VisibleItems;
use crate::config::KeyBindingsConfig;

/// Which control receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    /// Moving through the list.
    Browse,
    /// Typing into the new-item input.
    Input,
    /// Editing the title of this item inline.
    Rename(ItemId),
}

pub(super) struct Ui {
    /// Latest state published by the synchronization core.
    pub(super) state: SyncState,
    pub(super) visible: VisibleItems,
    pub(super) mode: Mode,
    /// New-item input.
    pub(super) input: TextField,
    /// Rename drafts keyed by item id.
    pub(super) drafts: HashMap<ItemId, TextField>,
    /// A create was submitted and has not reported back yet.
    pub(super) creating: bool,
    /// Item whose rename was submitted and has not reported back yet.
    pub(super) renaming: Option<ItemId>,
    pub(super) message: Option<Message>,
    pub(super) should_quit: bool,
    /// Keybindings configuration.
    pub(super) keybindings: KeyBindingsConfig,
}

impl Ui {
    pub(super) const TITLE_HEIGHT: u16 = 1;
    pub(super) const HEADER_HEIGHT: u16 = 3;
    pub(super) const LIST_MIN_HEIGHT: u16 = 3;
    pub(super) const FOOTER_HEIGHT: u16 = 1;
    pub(super) const BANNER_HEIGHT: u16 = 1;
    pub(super) const HELP_HEIGHT: u16 = 1;

    pub(super) fn new(state: SyncState, keybindings: KeyBindingsConfig) -> Self {
        let mut ui = Self {
            state: SyncState::default(),
            visible: VisibleItems::default(),
            mode: Mode::Browse,
            input: TextField::default(),
            drafts: HashMap::new(),
            creating: false,
            renaming: None,
            message: None,
            should_quit: false,
            keybindings,
        };
        ui.apply_state(state);
        ui
    }

    /// Adopt a new state snapshot from the core.
    pub(super) fn apply_state(&mut self, state: SyncState) {
        let keep_id = self.selected_item_id();
        self.state = state;
        self.visible.rebuild(&self.state, keep_id);

        let items = &self.state.items;
        self.drafts.retain(|id, _| items.iter().any(|item| item.id == *id));
        if let Mode::Rename(id) = self.mode
            && !self.drafts.contains_key(&id)
        {
            self.mode = Mode::Browse;
        }
    }

    pub(super) fn selected_item(&self) -> Option<&Item> {
        self.visible.selected_item(&self.state.items)
    }

    pub(super) fn selected_item_id(&self) -> Option<ItemId> {
        self.visible.selected_item_id(&self.state.items)
    }

    /// The new-item input accepts edits only while nothing is in flight.
    pub(super) const fn input_read_only(&self) -> bool {
        self.creating || self.state.is_busy()
    }

    /// Toggle-all is offered once items are loaded and there is at least one.
    pub(super) fn shows_toggle_all(&self) -> bool {
        !self.state.items.is_empty() && !self.state.is_initial_loading()
    }

    pub(super) fn draw(&self, f: &mut Frame<'_>) {
        let footer_height = if self.state.items.is_empty() {
            0
        } else {
            Self::FOOTER_HEIGHT
        };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Self::TITLE_HEIGHT),
                Constraint::Length(Self::HEADER_HEIGHT),
                Constraint::Min(Self::LIST_MIN_HEIGHT),
                Constraint::Length(footer_height),
                Constraint::Length(Self::BANNER_HEIGHT),
                Constraint::Length(Self::HELP_HEIGHT),
            ])
            .split(f.area());

        Self::draw_title(f, rows[0]);
        self.draw_header(f, rows[1]);
        self.draw_item_list(f, rows[2]);
        if footer_height > 0 {
            self.draw_footer(f, rows[3]);
        }
        self.draw_banner(f, rows[4]);
        self.draw_help(f, rows[5]);
    }

    pub(super) fn info(&mut self, message: impl Into<String>) {
        self.message = Some(Message::info(message));
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        self.message = Some(Message::error(message));
    }

    pub(super) fn tick(&mut self) {
        if let Some(msg) = &self.message
            && msg.is_expired(Duration::from_secs(UI_MESSAGE_TTL_SECS))
        {
            self.message = None;
        }
    }
}

/// Intent produced by a key press, carried out by the synchronization core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum UiAction {
    Create { title: String },
    Toggle { id: ItemId },
    ToggleAll,
    Remove { id: ItemId },
    ClearCompleted,
    Rename { id: ItemId, title: String },
    SetFilter(FilterStatus),
    DismissError,
}

/// Completion of an operation the UI waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum UiEvent {
    Created(Option<Item>),
    Renamed {
        id: ItemId,
        result: Result<RenameOutcome, ErrorKind>,
    },
}

pub(super) struct Message {
    pub(super) text: String,
    pub(super) level: MessageLevel,
    created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Info,
    Error,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Info,
            created_at: Instant::now(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Error,
            created_at: Instant::now(),
        }
    }

    pub(super) fn style(&self) -> Style {
        match self.level {
            MessageLevel::Info => Style::default().fg(Color::Green),
            MessageLevel::Error => Style::default().fg(Color::Red),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}
