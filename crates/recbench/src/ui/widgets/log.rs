//! Event log widget

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::dashboard::Dashboard;

/// Render the event log panel
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = Block::default()
        .title(" Recent Events ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Last N events that fit, oldest first
    let max_lines = inner.height as usize;
    let events = dashboard.recent_events();
    let start = events.len().saturating_sub(max_lines);
    let text = events[start..].join("\n");

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, inner);
}
