use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{wrapped_rows, View, ViewContext};
use crate::store::OllamaStatus;
use crate::ui::theme::Theme;
use crate::ui::widgets::last_updated_line;

/// Service status: installation, server, version and upgrade.
pub struct OllamaView;

impl View for OllamaView {
    fn title(&self) -> &str {
        "Ollama"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        let theme = ctx.theme;
        let status = ctx.state.store.snapshot();

        let mut lines = vec![
            field("Host", ctx.state.heartbeat.client().base_url().to_string(), theme.foreground, theme),
            flag_field("Installed", status.installed, theme),
            flag_field("Running", status.started, theme),
            field("Version", nvl(&status.version), theme.foreground, theme),
        ];
        lines.push(upgrade_line(&status, theme));
        lines.push(Line::from(""));
        lines.push(hint_line(&status, theme));
        lines.push(Line::from(""));
        lines.push(last_updated_line(ctx.state.store.updated_at(), theme));

        if status.upgrade {
            if let Some(release) = &status.last_version {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Release notes {}", release.name),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                )));
                lines.extend(release.body.lines().map(|l| Line::from(l.to_string())));
            }
        }

        let scroll = ctx.scroll_within(
            wrapped_rows(&lines, area.width.saturating_sub(2)),
            area.height.saturating_sub(2),
        );
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title("Ollama")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.ollama)),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll.top, scroll.left));

        f.render_widget(paragraph, area);
        Rect::default()
    }
}

fn nvl(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn field(label: &str, value: String, color: ratatui::style::Color, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(theme.muted)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn flag_field(label: &str, value: bool, theme: &Theme) -> Line<'static> {
    field(label, if value { "yes" } else { "no" }.to_string(), theme.flag(value), theme)
}

fn upgrade_line(status: &OllamaStatus, theme: &Theme) -> Line<'static> {
    match (&status.last_version, status.upgrade) {
        (Some(release), true) => field(
            "Latest",
            format!("{} available: {}", release.name, release.url),
            theme.warning,
            theme,
        ),
        (Some(release), false) => field("Latest", release.name.clone(), theme.foreground, theme),
        (None, _) => field("Latest", "-".to_string(), theme.muted, theme),
    }
}

fn hint_line(status: &OllamaStatus, theme: &Theme) -> Line<'static> {
    let (text, color) = if status.started {
        ("Ollama is running.", theme.success)
    } else if status.can_start {
        ("Ollama is installed but not running. Press [s] to start it.", theme.warning)
    } else if status.installed {
        ("Ollama is installed but not running. Start it with `ollama serve`.", theme.warning)
    } else {
        ("Ollama was not found. Download it from https://ollama.com/download", theme.error)
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}
