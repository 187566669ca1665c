//! TUI layout

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use librecbench_core::BenchConfig;

use crate::dashboard::Dashboard;
use super::widgets;

/// UI state
#[derive(Default)]
pub struct UiState {
    pub selected_metric: usize,
}

impl UiState {
    /// Move the metric selection, wrapping at both ends
    pub fn select_metric(&mut self, delta: i32, count: usize) {
        if count == 0 {
            self.selected_metric = 0;
            return;
        }
        let current = self.selected_metric.min(count - 1) as i64;
        self.selected_metric = (current + delta as i64).rem_euclid(count as i64) as usize;
    }
}

/// Draw the main UI
pub fn draw(frame: &mut Frame, config: &BenchConfig, dashboard: &Dashboard, state: &UiState) {
    let area = frame.area();

    // Main layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(2),  // Config bar
            Constraint::Min(10),    // Distribution + Percentile curve
            Constraint::Length(dashboard.metrics.len() as u16 + 3), // Metric table
            Constraint::Length(3),  // Summary
            Constraint::Length(6),  // Wall time + Event log
            Constraint::Length(1),  // Help bar
        ])
        .split(area);

    // Header
    render_header(frame, chunks[0]);

    // Config bar
    render_config_bar(frame, chunks[1], config, dashboard);

    // Distribution and percentile curve side by side
    let selected = dashboard.metric(state.selected_metric);
    let plot_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    widgets::distribution::render(frame, plot_chunks[0], selected);
    widgets::percentiles::render(frame, plot_chunks[1], selected);

    // Metric table
    widgets::metrics::render(frame, chunks[3], dashboard, state.selected_metric);

    // Summary
    widgets::summary::render(frame, chunks[4], dashboard);

    // Wall time and event log side by side
    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[5]);

    widgets::wall_time::render(frame, bottom_chunks[0], dashboard);
    widgets::log::render(frame, bottom_chunks[1], dashboard);

    // Help bar
    render_help_bar(frame, chunks[6], dashboard);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("RECBENCH - Book Recommender Benchmark")
        .style(Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_config_bar(frame: &mut Frame, area: Rect, config: &BenchConfig, dashboard: &Dashboard) {
    let elapsed_str = format!("{:.1}s", dashboard.elapsed().as_secs_f64());

    let config_text = format!(
        " Executable: {}  |  Query: \"{}\"  |  Iterations: {}  |  Elapsed: {} ",
        config.executable.display(),
        config.query,
        config.iterations,
        elapsed_str
    );

    let config_bar = Paragraph::new(config_text)
        .style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(config_bar, area);
}

fn render_help_bar(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let help_text = if dashboard.status.is_finished() {
        " [q]Quit and write report  [←→]Select metric "
    } else {
        " [q]Stop after current iteration  [←→]Select metric "
    };
    let help_bar = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_metric_wraps() {
        let mut state = UiState::default();
        state.select_metric(-1, 3);
        assert_eq!(state.selected_metric, 2);
        state.select_metric(1, 3);
        assert_eq!(state.selected_metric, 0);
        state.select_metric(1, 0);
        assert_eq!(state.selected_metric, 0);
    }
}
