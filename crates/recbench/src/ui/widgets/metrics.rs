//! Per-metric statistics table widget

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

use crate::dashboard::Dashboard;

/// Render one row per metric: sample count and the running summary
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard, selected: usize) {
    let block = Block::default()
        .title(" Metrics ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let header = Row::new(
        ["Metric", "N", "Mean", "Std", "Min", "Max", "P95", "P99"]
            .into_iter()
            .map(|h| Cell::from(h).style(header_style)),
    )
    .height(1);

    let rows: Vec<Row> = dashboard
        .metrics
        .iter()
        .enumerate()
        .map(|(index, (name, view))| {
            let name_style = if index == selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut cells = vec![
                Cell::from(name.clone()).style(name_style),
                Cell::from(view.values.len().to_string()),
            ];
            match view.summary {
                Some(s) => {
                    cells.extend(
                        [s.mean, s.std, s.min, s.max]
                            .into_iter()
                            .map(|v| Cell::from(format!("{:.2}", v))),
                    );
                    cells.push(Cell::from(format!("{:.2}", s.p95)).style(Style::default().fg(Color::Yellow)));
                    cells.push(Cell::from(format!("{:.2}", s.p99)).style(Style::default().fg(Color::Red)));
                }
                None => {
                    cells.push(Cell::from("no data").style(Style::default().fg(Color::DarkGray)));
                }
            }
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_widget(table, inner);
}
