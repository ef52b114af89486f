use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Tabs},
    Frame,
};

use super::{View, ViewContext};
use crate::app::nav::HomeTab;

pub struct HomeView;

impl View for HomeView {
    fn title(&self) -> &str {
        "Home"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let theme = ctx.theme;
        let selected = HomeTab::of(ctx.state.navigator.current().path())
            .and_then(|tab| HomeTab::all().iter().position(|t| *t == tab))
            .unwrap_or(0);

        let titles: Vec<Line> = HomeTab::all()
            .iter()
            .map(|tab| Line::from(tab.as_str().to_string()))
            .collect();

        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.muted))
                    .title("[←/→]"),
            )
            .select(selected)
            .style(Style::default().fg(theme.foreground))
            .highlight_style(Style::default().fg(theme.ollama).add_modifier(Modifier::BOLD));

        f.render_widget(tabs, chunks[0]);
        chunks[1]
    }
}
