use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::{View, ViewContext};
use crate::app::tasks::{ModelDetail, ModelsData};
use crate::ui::theme::Theme;
use crate::ui::widgets::render_monitor_status;

/// Local models and the ones currently loaded.
pub struct TagsView;

impl View for TagsView {
    fn title(&self) -> &str {
        "Models"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        // Rows move with the selection, not the page scroll.
        ctx.scroll_within(0, 0);

        let models = ctx.state.models.read();
        let Some(data) = models.data.as_ref() else {
            render_monitor_status(f, area, "Models", &models.status, models.last_updated, ctx.theme);
            return Rect::default();
        };

        let running_height = (data.running.len() as u16).clamp(1, 6) + 4;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(running_height)])
            .split(area);

        let detail = ctx.state.detail.read();
        let top = match detail.as_ref() {
            Some(detail) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[0]);
                render_detail(f, columns[1], detail, ctx.theme);
                columns[0]
            }
            None => chunks[0],
        };

        let selected = ctx.state.selected_model.min(data.models.len().saturating_sub(1));
        render_local(f, top, data, selected, ctx.theme);
        render_running(f, chunks[1], data, ctx.theme);
        Rect::default()
    }
}

fn header(cells: Vec<&'static str>, theme: &Theme) -> Row<'static> {
    Row::new(cells)
        .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .bottom_margin(1)
}

fn render_local(f: &mut Frame, area: Rect, data: &ModelsData, selected: usize, theme: &Theme) {
    let rows = data.models.iter().map(|model| {
        Row::new(vec![
            model.name.clone(),
            model.params_display.clone(),
            model.size_display.clone(),
            model.family.clone().unwrap_or_else(|| "-".to_string()),
            model.quantization.clone().unwrap_or_else(|| "-".to_string()),
            model
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(32),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(16),
        ],
    )
    .header(header(
        vec!["Name", "Params", "Size", "Family", "Quant", "Modified"],
        theme,
    ))
    .block(
        Block::default()
            .title(format!("Local models ({})", data.models.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.ollama)),
    )
    .style(Style::default().fg(theme.foreground))
    .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !data.models.is_empty() {
        state.select(Some(selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_detail(f: &mut Frame, area: Rect, detail: &ModelDetail, theme: &Theme) {
    let title = format!("{} [Esc] Close", detail.name);
    let Some(show) = detail.state.data.as_ref() else {
        render_monitor_status(f, area, &title, &detail.state.status, None, theme);
        return;
    };

    let label = |name: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{:<14}", name), Style::default().fg(theme.muted)),
            Span::styled(
                if value.is_empty() { "-".to_string() } else { value.to_string() },
                Style::default().fg(theme.foreground),
            ),
        ])
    };
    let details = &show.details;
    let mut lines = vec![
        label("Format", &details.format),
        label("Family", &details.family),
        label("Parameters", &details.parameter_size),
        label("Quantization", &details.quantization_level),
        label(
            "License",
            show.license.lines().next().unwrap_or_default().trim(),
        ),
    ];

    if !show.model_info.is_empty() {
        lines.push(Line::from(""));
        for (key, value) in &show.model_info {
            // Token tables and the like are too large to show.
            if value.is_array() || value.is_object() {
                continue;
            }
            let text = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            lines.push(label(key, &text));
        }
    }
    for (heading, text) in [("Parameters", &show.parameters), ("Template", &show.template)] {
        if text.is_empty() {
            continue;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            heading,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
        lines.extend(text.lines().map(|l| Line::from(l.to_string())));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_running(f: &mut Frame, area: Rect, data: &ModelsData, theme: &Theme) {
    let rows = data.running.iter().map(|model| {
        Row::new(vec![
            model.name.clone(),
            model.size_display.clone(),
            model.processor.clone(),
            model
                .until
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Min(10),
        ],
    )
    .header(header(vec!["Running", "Size", "Processor", "Until"], theme))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted)),
    )
    .style(Style::default().fg(theme.foreground));

    f.render_widget(table, area);
}
