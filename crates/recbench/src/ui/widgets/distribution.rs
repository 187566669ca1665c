//! Distribution histogram widget

use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, Paragraph},
};

use librecbench_core::stats;

use crate::dashboard::MetricView;

/// Render the distribution panel for the selected metric
pub fn render(frame: &mut Frame, area: Rect, selected: Option<(&String, &MetricView)>) {
    let title = match selected {
        Some((name, _)) => format!(" {} Distribution ", name),
        None => " Distribution ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let values = match selected {
        Some((_, view)) if !view.values.is_empty() => &view.values,
        _ => {
            render_placeholder(frame, inner, selected.is_some());
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    // One column per bin, as many as fit
    let bin_count = (chunks[0].width as usize / 2).clamp(1, 30);
    let bins = stats::histogram(values, bin_count);
    let data: Vec<(&str, u64)> = bins.iter().map(|b| ("", b.count as u64)).collect();
    let bar_width = (chunks[0].width / bins.len().max(1) as u16).max(1);

    let chart = BarChart::default()
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));
    frame.render_widget(chart, chunks[0]);

    // Range line
    if let (Some(first), Some(last)) = (bins.first(), bins.last()) {
        let range = Paragraph::new(format!("{:.2} .. {:.2}", first.lower, last.upper))
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);
        frame.render_widget(range, chunks[1]);
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, has_metric: bool) {
    let text = if has_metric { "no data yet" } else { "waiting for samples" };
    let placeholder = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(placeholder, area);
}
