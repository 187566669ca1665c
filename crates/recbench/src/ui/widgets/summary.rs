//! Summary stats widget

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::dashboard::{Dashboard, RunStatus};

/// Render the summary panel
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = Block::default()
        .title(" Summary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(inner);

    // Progress
    let progress = Gauge::default()
        .ratio(dashboard.progress_ratio())
        .label(format!("{}/{}", dashboard.attempted(), dashboard.total))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray));
    frame.render_widget(progress, chunks[0]);

    // Collected
    let collected = Paragraph::new(format!("Collected: {}", dashboard.collected))
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center);
    frame.render_widget(collected, chunks[1]);

    // Dropped
    let dropped = Paragraph::new(format!(
        "Dropped: {} ({:.1}%)",
        dashboard.dropped,
        dashboard.drop_rate()
    ))
    .style(if dashboard.dropped > 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    })
    .alignment(Alignment::Center);
    frame.render_widget(dropped, chunks[2]);

    // Status
    let status_style = match dashboard.status {
        RunStatus::Running => Style::default().fg(Color::Green),
        RunStatus::Stopping => Style::default().fg(Color::Yellow),
        RunStatus::Complete => Style::default().fg(Color::Cyan),
        RunStatus::Interrupted => Style::default().fg(Color::Yellow),
        RunStatus::Failed => Style::default().fg(Color::Red),
    };
    let status_text = match (dashboard.status, dashboard.current) {
        (RunStatus::Running, Some(iteration)) => format!("Running #{}", iteration + 1),
        (status, _) => status.as_str().to_string(),
    };
    let status = Paragraph::new(status_text)
        .style(status_style.add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(status, chunks[3]);
}
