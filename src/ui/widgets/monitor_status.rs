use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::state::MonitorStatus;
use crate::ui::theme::Theme;

/// Placeholder for a panel whose data is not available yet.
pub fn render_monitor_status(
    f: &mut Frame,
    area: Rect,
    title: &str,
    status: &MonitorStatus,
    last_updated: Option<DateTime<Local>>,
    theme: &Theme,
) {
    let (message, color) = match status {
        MonitorStatus::Loading => ("Loading data...", theme.warning),
        MonitorStatus::Ready => ("Data unavailable", theme.muted),
        MonitorStatus::Error(err) => (err.as_str(), theme.error),
    };

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        last_updated_line(last_updated, theme),
    ])
    .block(block)
    .style(Style::default().fg(theme.foreground));

    f.render_widget(paragraph, area);
}

pub fn last_updated_line(last_updated: Option<DateTime<Local>>, theme: &Theme) -> Line<'static> {
    let text = last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    Line::from(vec![
        Span::styled("Last updated: ", Style::default().fg(theme.muted)),
        Span::styled(
            text,
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}
