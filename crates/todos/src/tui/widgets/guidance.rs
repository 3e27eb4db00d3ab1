use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use todos_app::config::ENV_OWNER_ID;

/// Static screen shown instead of the list when no owner id is configured.
pub(in crate::tui) fn draw_guidance(f: &mut Frame<'_>, config_hint: &str) {
    let lines = vec![
        Line::styled(
            "No owner id configured",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::from("todos needs to know whose items to show before it contacts the server."),
        Line::from(format!("Set client.owner_id in {config_hint}")),
        Line::from(format!("or export {ENV_OWNER_ID}=<id>, then start todos again.")),
        Line::default(),
        Line::styled("Press q or Esc to quit.", Style::default().fg(Color::DarkGray)),
    ];
    let guidance = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("todos").borders(Borders::ALL));
    f.render_widget(guidance, f.area());
}
