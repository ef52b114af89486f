pub mod theme;
pub mod views;
pub mod widgets;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::nav::HomeTab;
use crate::app::state::PromptKind;
use crate::app::App;
use theme::Theme;
use views::ViewContext;

pub fn render(f: &mut Frame, app: &App) {
    let size = f.size();
    let theme = Theme::from_config(&app.state.config.read());

    // Fill the frame so stale cells from the previous route are cleared.
    let background = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(background, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Route chain
            Constraint::Length(3), // Footer / path prompt
        ])
        .split(size);

    render_header(f, chunks[0], app, &theme);
    render_content(f, chunks[1], app, &theme);
    render_footer(f, chunks[2], app, &theme);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let state = &app.state;
    let app_name = state.config.read().general.app_name.clone();
    let store = &state.store;

    let (label, color) = if store.started() {
        (format!("Ollama {} running", store.version()), theme.success)
    } else if store.installed() {
        ("Ollama stopped".to_string(), theme.warning)
    } else {
        ("Ollama not installed".to_string(), theme.error)
    };

    let page = state
        .navigator
        .current()
        .leaf()
        .and_then(|id| state.views.get(id))
        .map(|view| view.title().to_string())
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(
            format!("{} v{}", app_name, state.app_info.version),
            Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled(page, Style::default().fg(theme.accent)),
        Span::raw("  │  "),
        Span::styled(label, Style::default().fg(color)),
    ];
    if store.upgrade() {
        spans.push(Span::styled(
            " (upgrade available)",
            Style::default().fg(theme.warning),
        ));
    }

    let text = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.foreground)),
        )
        .alignment(Alignment::Center);

    f.render_widget(text, area);
}

/// Renders the matched views outermost first; each one hands the next the
/// area it leaves free.
fn render_content(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let state = &app.state;
    let ctx = ViewContext {
        state,
        theme,
        scroll: state.navigator.scroll(),
    };

    let mut outlet = area;
    for id in &state.navigator.current().matched {
        let Some(view) = state.views.get(*id) else {
            let placeholder = Paragraph::new(format!("Loading {}...", id.as_str()))
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(theme.muted));
            f.render_widget(placeholder, outlet);
            return;
        };
        outlet = view.render(f, outlet, &ctx);
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL);

    let navigator = &app.state.navigator;

    if let Some(prompt) = &app.state.prompt {
        let (label, hint) = match prompt.kind {
            PromptKind::Path => (
                ":",
                format!("  [Enter] Go [Esc] Cancel │ {}", navigator.router().paths().join(" ")),
            ),
            PromptKind::Pull => (
                "pull ",
                "  [Enter] Pull [Esc] Cancel │ name[:tag], e.g. llama3.2:1b".to_string(),
            ),
        };
        let line = Line::from(vec![
            Span::styled(
                format!("{}{}█", label, prompt.input),
                Style::default().fg(theme.accent),
            ),
            Span::styled(hint, Style::default().fg(theme.muted)),
        ]);
        f.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let history = match (navigator.can_go_back(), navigator.can_go_forward()) {
        (true, true) => " │ [Alt+←/→] History",
        (true, false) => " │ [Alt+←] Back",
        (false, true) => " │ [Alt+→] Forward",
        (false, false) => "",
    };
    let page = match HomeTab::of(navigator.current().path()) {
        Some(HomeTab::Tags) => " │ [↑/↓] Select [i] Info [d] Delete [p] Pull",
        Some(_) => " │ [p] Pull",
        None => "",
    };
    let mut spans = vec![Span::styled(
        format!(
            "[Tab] Section │ [←/→] Tab │ [1-6] Jump │ [:] Path{}{} │ [s] Start │ [r] Refresh │ [q] Quit",
            history, page
        ),
        Style::default().fg(theme.muted),
    )];
    if let Some(notice) = app.state.notice.read().as_ref() {
        let color = if notice.error { theme.error } else { theme.success };
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(notice.text.clone(), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}
