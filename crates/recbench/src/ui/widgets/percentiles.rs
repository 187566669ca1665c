//! Percentile curve widget

use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use librecbench_core::stats;

use crate::dashboard::MetricView;

/// Render the percentile curve (p1..p100) for the selected metric
pub fn render(frame: &mut Frame, area: Rect, selected: Option<(&String, &MetricView)>) {
    let title = match selected {
        Some((name, _)) => format!(" {} Percentiles ", name),
        None => " Percentiles ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let view = match selected {
        Some((_, view)) if !view.values.is_empty() => view,
        _ => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let placeholder = Paragraph::new("no data yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(placeholder, inner);
            return;
        }
    };

    let points: Vec<(f64, f64)> = stats::percentile_curve(&view.values)
        .iter()
        .map(|p| (p.percentile as f64, p.value))
        .collect();

    let (mut y_min, mut y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));
    if y_min == y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Magenta))
        .data(&points);

    let mut markers = Vec::new();
    if let Some(summary) = view.summary {
        markers.push(Span::styled(format!("p95 {:.2}", summary.p95), Style::default().fg(Color::Yellow)));
        markers.push(Span::raw("  "));
        markers.push(Span::styled(format!("p99 {:.2}", summary.p99), Style::default().fg(Color::Red)));
    }

    let chart = Chart::new(vec![dataset])
        .block(block.title_bottom(Line::from(markers).alignment(Alignment::Center)))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([1.0, 100.0])
                .labels(vec![Span::raw("p1"), Span::raw("p50"), Span::raw("p100")]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );
    frame.render_widget(chart, area);
}
