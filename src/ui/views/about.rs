use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{View, ViewContext};
use crate::ui::theme::Theme;

/// Application details, upgrade notice and the Ollama server environment.
pub struct AboutView;

impl View for AboutView {
    fn title(&self) -> &str {
        "About"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        let theme = ctx.theme;
        let state = ctx.state;
        let info = &state.app_info;
        let app_name = state.config.read().general.app_name.clone();

        let mut lines = vec![
            Line::from(Span::styled(
                app_name,
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            )),
            row("Version", info.version.to_string(), theme),
            row(
                "Build",
                info.build_hash.clone().unwrap_or_else(|| "-".to_string()),
                theme,
            ),
            row("Platform", format!("{}/{}", info.os, info.arch), theme),
            row("Config", state.config_path.display().to_string(), theme),
        ];

        if let Some(release) = state.app_release.read().as_ref() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", "Upgrade"), Style::default().fg(theme.muted)),
                Span::styled(
                    format!("{} available: {}", release.name, release.url),
                    Style::default().fg(theme.warning),
                ),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Ollama server environment",
            Style::default().fg(theme.ollama).add_modifier(Modifier::BOLD),
        )));
        for var in &state.env_vars {
            let value = if var.value.is_empty() {
                Span::styled("unset", Style::default().fg(theme.muted))
            } else {
                Span::styled(var.value.clone(), Style::default().fg(theme.success))
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<26}", var.name), Style::default().fg(theme.foreground)),
                value,
                Span::styled(format!("  {}", var.description), Style::default().fg(theme.muted)),
            ]));
        }

        // /chat and /setting mount this view too.
        let title = match state.navigator.current().path() {
            "/about" => "About".to_string(),
            path => format!("About ({})", path),
        };

        let scroll = ctx.scroll_within(lines.len(), area.height.saturating_sub(2));
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .style(Style::default().fg(theme.foreground))
            .scroll((scroll.top, scroll.left));

        f.render_widget(paragraph, area);
        Rect::default()
    }
}

fn row(label: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(theme.muted)),
        Span::styled(value, Style::default().fg(theme.foreground)),
    ])
}
