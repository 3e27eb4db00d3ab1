use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::super::constants::NEW_ITEM_PLACEHOLDER;
use super::super::view::{Mode, Ui};

const TOGGLE_ALL_WIDTH: u16 = 5;

impl Ui {
    pub(in crate::tui) fn draw_title(f: &mut Frame<'_>, area: Rect) {
        let title = Paragraph::new("todos")
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(title, area);
    }

    pub(in crate::tui) fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let columns = Layout::horizontal([Constraint::Length(TOGGLE_ALL_WIDTH), Constraint::Min(1)]).split(area);

        if self.shows_toggle_all() {
            let style = if self.state.stats().all_completed() {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = Paragraph::new(Span::styled("❯", style))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(marker, columns[0]);
        }

        let read_only = self.input_read_only();
        let focused = self.mode == Mode::Input;
        let line = if self.input.is_empty() {
            Line::from(Span::styled(
                NEW_ITEM_PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(self.input.text())
        };
        let text_style = if read_only {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let title = if read_only { "New item (busy)" } else { "New item" };
        let input = Paragraph::new(line)
            .style(text_style)
            .block(Block::default().title(title).borders(Borders::ALL).border_style(border_style));
        f.render_widget(input, columns[1]);

        if focused && !read_only {
            let field = columns[1];
            let offset = u16::try_from(Span::raw(self.input.before_cursor()).width()).unwrap_or(u16::MAX);
            let max_x = field.right().saturating_sub(2);
            let x = field.x.saturating_add(1).saturating_add(offset).min(max_x);
            f.set_cursor_position((x, field.y + 1));
        }
    }
}
