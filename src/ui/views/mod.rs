pub mod about;
pub mod home;
pub mod layout;
pub mod ollama;
pub mod online;
pub mod tags;

use ratatui::{layout::Rect, text::Line, Frame};
use std::collections::HashMap;
use std::sync::atomic::Ordering;

use crate::app::AppState;
use crate::router::{ScrollPosition, ViewId};
use crate::ui::theme::Theme;

/// What a view may read while rendering.
pub struct ViewContext<'a> {
    pub state: &'a AppState,
    pub theme: &'a Theme,
    pub scroll: ScrollPosition,
}

impl ViewContext<'_> {
    /// Scroll offset for `rows` lines shown in `viewport` rows. The limit is
    /// kept so scroll keys stop at the last page.
    pub fn scroll_within(&self, rows: usize, viewport: u16) -> ScrollPosition {
        let max_top = ScrollPosition::max_top(rows, viewport);
        self.state.scroll_limit.store(max_top, Ordering::Relaxed);
        self.scroll.clamped(max_top)
    }
}

/// Rows `lines` take when wrapped to `width` columns.
pub fn wrapped_rows(lines: &[Line], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

/// A screen, or part of one, mounted by a route.
///
/// Views that host nested routes return the area left for their child;
/// leaf views return an empty area.
pub trait View: Send + Sync {
    fn title(&self) -> &str;

    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect;
}

pub type ViewFactory = fn() -> Box<dyn View>;

/// Views are built the first time a route needs them and kept afterwards.
pub struct ViewRegistry {
    factories: HashMap<ViewId, ViewFactory>,
    loaded: HashMap<ViewId, Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            loaded: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ViewId::Layout, || Box::new(layout::LayoutView));
        registry.register(ViewId::Home, || Box::new(home::HomeView));
        registry.register(ViewId::Ollama, || Box::new(ollama::OllamaView));
        registry.register(ViewId::Tags, || Box::new(tags::TagsView));
        registry.register(ViewId::Online, || Box::new(online::OnlineView));
        registry.register(ViewId::About, || Box::new(about::AboutView));
        registry
    }

    pub fn register(&mut self, id: ViewId, factory: ViewFactory) {
        self.factories.insert(id, factory);
    }

    pub fn load(&mut self, id: ViewId) -> Option<&dyn View> {
        if !self.is_loaded(id) {
            let Some(factory) = self.factories.get(&id) else {
                log::warn!("No view registered for {}", id.as_str());
                return None;
            };
            log::debug!("Loading view {}", id.as_str());
            self.loaded.insert(id, factory());
        }
        self.get(id)
    }

    pub fn load_chain(&mut self, chain: &[ViewId]) {
        for id in chain {
            self.load(*id);
        }
    }

    pub fn get(&self, id: ViewId) -> Option<&dyn View> {
        self.loaded.get(&id).map(|view| view.as_ref())
    }

    pub fn is_loaded(&self, id: ViewId) -> bool {
        self.loaded.contains_key(&id)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}
