//! Invocation wall-time sparkline widget

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Sparkline},
};

use crate::dashboard::Dashboard;

/// Render the wall-clock time of recent invocations
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = Block::default()
        .title(" Invocation Wall Time (ms) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    // Most recent invocations that fit the width
    let width = chunks[0].width as usize;
    let skip = dashboard.wall_times_ms.len().saturating_sub(width);
    let data: Vec<u64> = dashboard.wall_times_ms.iter().skip(skip).copied().collect();
    let sparkline = Sparkline::default()
        .data(&data)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, chunks[0]);

    let last = dashboard.wall_times_ms.back().copied().unwrap_or(0);
    let stats = format!(
        "Last: {}ms  Mean: {:.0}ms",
        last,
        dashboard.mean_wall_time_ms()
    );
    let stats_widget = Paragraph::new(stats)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(stats_widget, chunks[1]);
}
