use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use todos_core::FilterStatus;

use super::super::view::{Mode, Ui};

impl Ui {
    pub(in crate::tui) fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let stats = self.state.stats();
        let mut spans = vec![Span::raw(stats.items_left_label()), Span::raw("   ")];
        for filter in FilterStatus::ALL {
            let style = if filter == self.state.filter {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {filter} "), style));
            spans.push(Span::raw(" "));
        }
        let clear_style = if stats.has_completed() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Clear completed", clear_style));

        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    pub(in crate::tui) fn draw_banner(&self, f: &mut Frame<'_>, area: Rect) {
        let banner = if let Some(kind) = self.state.error_kind() {
            let dismiss = self
                .keybindings
                .item_list
                .dismiss_error
                .first()
                .map_or_else(String::new, |key| format!("  ({key}: dismiss)"));
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("✗ {kind}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(dismiss, Style::default().fg(Color::DarkGray)),
            ]))
        } else if let Some(message) = &self.message {
            Paragraph::new(message.text.as_str()).style(message.style())
        } else {
            return;
        };
        f.render_widget(banner, area);
    }

    pub(in crate::tui) fn draw_help(&self, f: &mut Frame<'_>, area: Rect) {
        let help = Paragraph::new(self.instructions()).style(Style::default().fg(Color::DarkGray));
        f.render_widget(help, area);
    }

    pub(in crate::tui) fn instructions(&self) -> String {
        match self.mode {
            Mode::Browse => self.keybindings.generate_help_text(),
            Mode::Input => "↵:add Esc:back to list".to_owned(),
            Mode::Rename(_) => "↵:save ↑/↓:save and move Esc:cancel".to_owned(),
        }
    }
}
