use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame,
};

use super::{View, ViewContext};
use crate::app::nav::Section;

/// Application shell: the section bar above every page.
pub struct LayoutView;

impl View for LayoutView {
    fn title(&self) -> &str {
        "Layout"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let theme = ctx.theme;
        let current = Section::of(ctx.state.navigator.current().path());

        let titles: Vec<Line> = Section::all()
            .iter()
            .map(|section| {
                let style = if Some(*section) == current {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.foreground)
                };
                Line::from(Span::styled(section.as_str().to_string(), style))
            })
            .collect();

        let selected = current
            .and_then(|c| Section::all().iter().position(|s| *s == c))
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(selected)
            .style(Style::default().fg(theme.foreground))
            .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

        f.render_widget(tabs, chunks[0]);
        chunks[1]
    }
}
