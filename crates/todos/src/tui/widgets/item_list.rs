use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use todos_core::Item;
use todos_core::id::ItemId;

use super::super::constants::{
    ITEM_LIST_HIGHLIGHT_SYMBOL, LOADING_ROW_SUFFIX, PENDING_ROW_SUFFIX, RENAME_PLACEHOLDER,
};
use super::super::view::{Mode, Ui};
use super::util::{checkbox, truncate_with_ellipsis};

/// Columns taken by borders, the highlight symbol and the checkbox.
const ROW_CHROME_WIDTH: u16 = 2 + 2 + 4;

impl Ui {
    pub(in crate::tui) fn draw_item_list(&self, f: &mut Frame<'_>, area: Rect) {
        let title_width = usize::from(area.width.saturating_sub(ROW_CHROME_WIDTH));
        let dim = Style::default().fg(Color::DarkGray);

        let mut rows: Vec<ListItem<'_>> = Vec::new();
        if self.state.is_initial_loading() {
            rows.push(ListItem::new(Line::styled("Loading…", dim)));
        } else if self.visible.has_visible_items() {
            rows.extend(
                self.visible
                    .visible_items(&self.state.items)
                    .map(|item| self.item_row(item, title_width)),
            );
        } else if self.state.pending.is_none() {
            let message = if self.state.items.is_empty() {
                "Nothing to do"
            } else {
                "No items match this filter"
            };
            rows.push(ListItem::new(Line::styled(message, dim)));
        }
        if let Some(pending) = &self.state.pending {
            let title = truncate_with_ellipsis(&pending.title, title_width);
            rows.push(ListItem::new(Line::styled(
                format!("{}{title} {PENDING_ROW_SUFFIX}", checkbox(false)),
                dim.add_modifier(Modifier::ITALIC),
            )));
        }

        let list = List::new(rows)
            .block(Block::default().title(self.state.filter.label()).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(ITEM_LIST_HIGHLIGHT_SYMBOL);
        let mut state = ListState::default();
        let has_items = !self.state.is_initial_loading() && self.visible.has_visible_items();
        if has_items {
            state.select(Some(self.visible.selected_index()));
        }
        f.render_stateful_widget(list, area, &mut state);

        if has_items && let Mode::Rename(id) = self.mode {
            self.place_rename_cursor(f, area, state.offset(), id);
        }
    }

    fn item_row(&self, item: &Item, title_width: usize) -> ListItem<'_> {
        let loading = self.state.is_loading(item.id);
        let draft = match self.mode {
            Mode::Rename(id) if id == item.id => self.drafts.get(&id),
            _ => None,
        };

        let mut spans = vec![Span::raw(checkbox(item.completed))];
        if let Some(draft) = draft {
            let editor = Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
            if draft.is_empty() {
                spans.push(Span::styled(RENAME_PLACEHOLDER, editor.add_modifier(Modifier::ITALIC)));
            } else {
                spans.push(Span::styled(draft.text().to_owned(), editor));
            }
        } else {
            let style = if item.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            spans.push(Span::styled(
                truncate_with_ellipsis(&item.title, title_width).into_owned(),
                style,
            ));
        }
        if loading {
            spans.push(Span::raw(format!(" {LOADING_ROW_SUFFIX}")));
        }

        let row = ListItem::new(Line::from(spans));
        if loading {
            row.style(Style::default().fg(Color::DarkGray))
        } else {
            row
        }
    }

    fn place_rename_cursor(&self, f: &mut Frame<'_>, area: Rect, offset: usize, id: ItemId) {
        if self.renaming == Some(id) {
            return;
        }
        let Some(draft) = self.drafts.get(&id) else {
            return;
        };
        let Some(position) = self
            .visible
            .visible_items(&self.state.items)
            .position(|item| item.id == id)
        else {
            return;
        };
        let Some(row) = position.checked_sub(offset).and_then(|row| u16::try_from(row).ok()) else {
            return;
        };
        let inner_height = area.height.saturating_sub(2);
        if row >= inner_height {
            return;
        }

        let prefix = format!("{ITEM_LIST_HIGHLIGHT_SYMBOL}{}{}", checkbox(false), draft.before_cursor());
        let column = u16::try_from(Span::raw(prefix).width()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(column).min(area.right().saturating_sub(2));
        f.set_cursor_position((x, area.y + 1 + row));
    }
}
