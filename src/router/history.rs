use std::sync::Arc;

use super::{scroll_behavior, Resolved, RouteError, Router, ScrollPosition};

#[derive(Debug, Clone)]
struct HistoryEntry {
    resolved: Resolved,
    saved: Option<ScrollPosition>,
}

/// In-memory navigation history: the current route, back/forward entries and
/// the content scroll offset.
pub struct Navigator {
    router: Arc<Router>,
    entries: Vec<HistoryEntry>,
    index: usize,
    scroll: ScrollPosition,
}

impl Navigator {
    pub fn new(router: Arc<Router>, initial: &str) -> Result<Self, RouteError> {
        let resolved = router.resolve(initial)?;
        Ok(Self {
            router,
            entries: vec![HistoryEntry {
                resolved,
                saved: None,
            }],
            index: 0,
            scroll: ScrollPosition::TOP,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn current(&self) -> &Resolved {
        &self.entries[self.index].resolved
    }

    pub fn scroll(&self) -> ScrollPosition {
        self.scroll
    }

    pub fn scroll_by(&mut self, rows: i32, max_top: u16) {
        self.scroll = self.scroll.scrolled_by(rows, max_top);
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Navigates to `path`, dropping any forward history. Navigating to the
    /// location already shown is a no-op.
    pub fn push(&mut self, path: &str) -> Result<&Resolved, RouteError> {
        let resolved = self.router.resolve(path)?;
        if resolved.location == self.current().location {
            return Ok(self.current());
        }

        let scroll = scroll_behavior(&resolved, Some(self.current()), None);
        self.entries[self.index].saved = Some(self.scroll);
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            resolved,
            saved: None,
        });
        self.index += 1;
        self.scroll = scroll;

        log::debug!("navigated to {}", self.current().location);
        Ok(self.current())
    }

    #[allow(dead_code)]
    pub fn replace(&mut self, path: &str) -> Result<&Resolved, RouteError> {
        let resolved = self.router.resolve(path)?;
        self.scroll = scroll_behavior(&resolved, Some(self.current()), None);
        self.entries[self.index] = HistoryEntry {
            resolved,
            saved: None,
        };
        Ok(self.current())
    }

    pub fn back(&mut self) -> Option<&Resolved> {
        if !self.can_go_back() {
            return None;
        }
        self.traverse(self.index - 1);
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&Resolved> {
        if !self.can_go_forward() {
            return None;
        }
        self.traverse(self.index + 1);
        Some(self.current())
    }

    fn traverse(&mut self, to: usize) {
        self.entries[self.index].saved = Some(self.scroll);
        let from = self.index;
        self.index = to;

        let target = &self.entries[to];
        self.scroll = scroll_behavior(
            &target.resolved,
            Some(&self.entries[from].resolved),
            target.saved,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{app_routes, DEFAULT_PATH};

    fn navigator() -> Navigator {
        Navigator::new(Arc::new(Router::new(app_routes())), "/").expect("navigator")
    }

    #[test]
    fn starts_on_default_path() {
        let nav = navigator();
        assert_eq!(nav.current().path(), DEFAULT_PATH);
        assert!(!nav.can_go_back());
        assert_eq!(nav.scroll(), ScrollPosition::TOP);
    }

    #[test]
    fn push_resets_scroll_and_back_restores_it() {
        let mut nav = navigator();
        nav.scroll_by(12, u16::MAX);

        nav.push("/about").expect("push");
        assert_eq!(nav.scroll(), ScrollPosition::TOP);
        nav.scroll_by(3, u16::MAX);

        let back = nav.back().expect("back").path().to_string();
        assert_eq!(back, DEFAULT_PATH);
        assert_eq!(nav.scroll().top, 12);

        let forward = nav.forward().expect("forward").path().to_string();
        assert_eq!(forward, "/about");
        assert_eq!(nav.scroll().top, 3);
    }

    #[test]
    fn push_truncates_forward_history() {
        let mut nav = navigator();
        nav.push("/home/tags").expect("push");
        nav.push("/home/online").expect("push");
        nav.back();
        nav.push("/chat").expect("push");

        assert!(!nav.can_go_forward());
        assert_eq!(nav.back().map(|r| r.path().to_string()), Some("/home/tags".into()));
    }

    #[test]
    fn duplicate_navigation_is_ignored() {
        let mut nav = navigator();
        nav.scroll_by(4, u16::MAX);
        nav.push("/nowhere").expect("push");
        assert!(!nav.can_go_back());
        assert_eq!(nav.scroll().top, 4);
    }

    #[test]
    fn history_edges() {
        let mut nav = navigator();
        assert!(nav.back().is_none());
        assert!(nav.forward().is_none());
    }

    #[test]
    fn replace_keeps_history_length() {
        let mut nav = navigator();
        nav.push("/chat").expect("push");
        nav.replace("/setting").expect("replace");
        assert_eq!(nav.current().path(), "/setting");
        assert_eq!(nav.back().map(|r| r.path().to_string()), Some(DEFAULT_PATH.into()));
        assert!(!nav.can_go_back());
    }
}
