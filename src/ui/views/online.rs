use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::{wrapped_rows, View, ViewContext};
use crate::app::tasks::PullState;
use crate::ui::theme::Theme;
use crate::utils::format::format_bytes;

const LIBRARY_URL: &str = "https://ollama.com/library";

/// Pulling models from the Ollama library, and the newest Ollama release.
pub struct OnlineView;

impl View for OnlineView {
    fn title(&self) -> &str {
        "Online"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(area);

        render_pull(f, chunks[0], ctx.state.pull.read().as_ref(), ctx.theme);
        render_release(f, chunks[1], ctx);
        Rect::default()
    }
}

fn render_pull(f: &mut Frame, area: Rect, pull: Option<&PullState>, theme: &Theme) {
    let Some(pull) = pull else {
        let lines = vec![
            Line::from(vec![
                Span::styled("Browse  ", Style::default().fg(theme.muted)),
                Span::styled(LIBRARY_URL, Style::default().fg(theme.accent)),
            ]),
            Line::from(Span::styled(
                "Press p and enter a model name to pull it; it shows up under Models.",
                Style::default().fg(theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Pull").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    };

    let block = Block::default()
        .title(format!("Pull {}", pull.model))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.ollama));

    if let Some(error) = &pull.error {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )))
        .block(block)
        .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    }

    let progress = &pull.progress;
    let status = if pull.done {
        "done".to_string()
    } else if progress.status.is_empty() {
        "waiting for server".to_string()
    } else {
        progress.status.clone()
    };
    let label = match (progress.completed, progress.total) {
        (Some(done), Some(total)) => format!(
            "{}  {} / {}",
            status,
            format_bytes(done),
            format_bytes(total)
        ),
        _ => status,
    };
    let percent = if pull.done {
        100
    } else {
        progress.percent().unwrap_or(0)
    };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(theme.ollama))
        .percent(percent)
        .label(label);
    f.render_widget(gauge, area);
}

fn render_release(f: &mut Frame, area: Rect, ctx: &ViewContext) {
    let theme = ctx.theme;
    let mut lines = Vec::new();

    match ctx.state.store.last_version() {
        Some(release) => {
            lines.push(Line::from(Span::styled(
                format!("Latest Ollama release: {}", release.name),
                Style::default().fg(theme.ollama).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                release.url.clone(),
                Style::default().fg(theme.accent),
            )));
            lines.push(Line::from(""));
            lines.extend(release.body.lines().map(|l| Line::from(l.to_string())));
        }
        None => lines.push(Line::from(Span::styled(
            "Latest release not known yet.",
            Style::default().fg(theme.muted),
        ))),
    }

    let scroll = ctx.scroll_within(
        wrapped_rows(&lines, area.width.saturating_sub(2)),
        area.height.saturating_sub(2),
    );
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Releases").borders(Borders::ALL))
        .style(Style::default().fg(theme.foreground))
        .wrap(Wrap { trim: false })
        .scroll((scroll.top, scroll.left));

    f.render_widget(paragraph, area);
}
