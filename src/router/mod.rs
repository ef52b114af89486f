pub mod history;
pub mod location;
pub mod pattern;
pub mod routes;
pub mod scroll;

pub use history::Navigator;
pub use location::Location;
pub use pattern::Params;
pub use routes::{app_routes, ViewId, DEFAULT_PATH};
pub use scroll::{scroll_behavior, ScrollPosition};

use pattern::{join_paths, PathPattern};
use thiserror::Error;

/// Upper bound on chained redirects before a table is considered broken.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches {0}")]
    NoMatch(String),
    #[error("redirect loop while resolving {from} (stopped at {at})")]
    RedirectLoop { from: String, at: String },
}

/// One entry of the declarative route table.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: String,
    pub view: Option<ViewId>,
    pub redirect: Option<String>,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: &str, view: ViewId) -> Self {
        Self {
            path: path.to_string(),
            view: Some(view),
            redirect: None,
            children: Vec::new(),
        }
    }

    pub fn redirect(path: &str, target: &str) -> Self {
        Self {
            path: path.to_string(),
            view: None,
            redirect: Some(target.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_redirect(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

/// Result of resolving a location against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub location: Location,
    /// Full pattern of the matched record, e.g. `/home/ollama`
    pub route: String,
    /// Views to mount, outermost first
    pub matched: Vec<ViewId>,
    pub params: Params,
    /// Location that was requested when at least one redirect happened
    pub redirected_from: Option<Location>,
}

impl Resolved {
    pub fn leaf(&self) -> Option<ViewId> {
        self.matched.last().copied()
    }

    pub fn path(&self) -> &str {
        &self.location.path
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    full_path: String,
    pattern: PathPattern,
    chain: Vec<ViewId>,
    redirect: Option<String>,
}

/// Immutable route table plus the matcher over it.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    pub fn new(records: Vec<RouteRecord>) -> Self {
        let mut routes = Vec::new();
        for record in &records {
            compile(record, "", &[], &mut routes);
        }

        // Catch-all entries only apply once every specific route failed.
        routes.sort_by_key(|route| route.pattern.is_catch_all());

        Self { routes }
    }

    pub fn resolve(&self, raw: &str) -> Result<Resolved, RouteError> {
        let requested = Location::parse(raw);
        let mut location = requested.clone();

        for _ in 0..=MAX_REDIRECTS {
            let segments = location.segments();
            let (route, params) = self
                .routes
                .iter()
                .find_map(|route| route.pattern.matches(&segments).map(|p| (route, p)))
                .ok_or_else(|| RouteError::NoMatch(location.to_string()))?;

            if let Some(target) = &route.redirect {
                log::trace!("redirect {} -> {}", location, target);
                location = location.redirected_to(Location::parse(target));
                continue;
            }

            let redirected_from = if location.path != requested.path {
                Some(requested)
            } else {
                None
            };

            return Ok(Resolved {
                location,
                route: route.full_path.clone(),
                matched: route.chain.clone(),
                params,
                redirected_from,
            });
        }

        Err(RouteError::RedirectLoop {
            from: requested.to_string(),
            at: location.to_string(),
        })
    }

    /// Every concrete (non-redirecting, non-parameterized) path in the table.
    pub fn paths(&self) -> Vec<&str> {
        self.routes
            .iter()
            .filter(|route| route.redirect.is_none() && !route.full_path.contains(':'))
            .map(|route| route.full_path.as_str())
            .collect()
    }
}

fn compile(record: &RouteRecord, parent: &str, chain: &[ViewId], out: &mut Vec<CompiledRoute>) {
    let full_path = location::normalize_path(&join_paths(parent, &record.path));
    let mut chain = chain.to_vec();
    if let Some(view) = record.view {
        chain.push(view);
    }

    // Grouping records with neither a view nor a redirect are never a
    // destination on their own, only their children are.
    if record.view.is_some() || record.redirect.is_some() {
        out.push(CompiledRoute {
            full_path: full_path.clone(),
            pattern: PathPattern::parse(&full_path),
            chain: chain.clone(),
            redirect: record.redirect.clone(),
        });
    }

    for child in &record.children {
        compile(child, &full_path, &chain, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::new(app_routes())
    }

    #[test]
    fn declared_paths_resolve_to_their_leaf() {
        let router = router();
        let cases = [
            ("/home/ollama", ViewId::Ollama),
            ("/home/tags", ViewId::Tags),
            ("/home/online", ViewId::Online),
            ("/chat", ViewId::About),
            ("/setting", ViewId::About),
            ("/about", ViewId::About),
        ];
        for (path, leaf) in cases {
            let resolved = router.resolve(path).expect("resolves");
            assert_eq!(resolved.path(), path);
            assert_eq!(resolved.leaf(), Some(leaf), "leaf of {}", path);
            assert_eq!(resolved.redirected_from, None);
        }
    }

    #[test]
    fn home_children_mount_inside_layout_and_home() {
        let resolved = router().resolve("/home/tags").expect("resolves");
        assert_eq!(
            resolved.matched,
            vec![ViewId::Layout, ViewId::Home, ViewId::Tags]
        );

        let resolved = router().resolve("/about").expect("resolves");
        assert_eq!(resolved.matched, vec![ViewId::Layout, ViewId::About]);
    }

    #[test]
    fn root_redirects_to_default() {
        let router = router();
        let root = router.resolve("/").expect("resolves");
        let default = router.resolve(DEFAULT_PATH).expect("resolves");
        assert_eq!(root.location, default.location);
        assert_eq!(root.matched, default.matched);
        assert_eq!(root.redirected_from.map(|l| l.path), Some("/".to_string()));

        let home = router.resolve("/home").expect("resolves");
        assert_eq!(home.path(), DEFAULT_PATH);
    }

    #[test]
    fn unmatched_paths_fall_back_to_default() {
        let router = router();
        let default = router.resolve(DEFAULT_PATH).expect("resolves");
        for path in ["/nope", "/home/unknown", "/chat/extra/segments", "garbage?x#y"] {
            let resolved = router.resolve(path).expect("resolves");
            assert_eq!(resolved.path(), default.path(), "fallback for {}", path);
            assert_eq!(resolved.matched, default.matched);
            assert_eq!(resolved.route, "/home/ollama");
        }
    }

    #[test]
    fn catch_all_is_tried_last_even_when_declared_first() {
        let router = Router::new(vec![
            RouteRecord::redirect("/:pathMatch(.*)*", "/a"),
            RouteRecord::new("/a", ViewId::About),
            RouteRecord::new("/b", ViewId::Tags),
        ]);
        assert_eq!(router.resolve("/b").expect("resolves").leaf(), Some(ViewId::Tags));
        assert_eq!(router.resolve("/zzz").expect("resolves").path(), "/a");
    }

    #[test]
    fn first_declared_match_wins() {
        let router = Router::new(vec![
            RouteRecord::new("/dup", ViewId::Tags),
            RouteRecord::new("/dup", ViewId::Online),
        ]);
        assert_eq!(router.resolve("/dup").expect("resolves").leaf(), Some(ViewId::Tags));
    }

    #[test]
    fn redirect_loops_are_reported() {
        let router = Router::new(vec![
            RouteRecord::redirect("/a", "/b"),
            RouteRecord::redirect("/b", "/a"),
        ]);
        match router.resolve("/a") {
            Err(RouteError::RedirectLoop { from, .. }) => assert_eq!(from, "/a"),
            other => panic!("expected loop, got {:?}", other),
        }
    }

    #[test]
    fn table_without_catch_all_reports_no_match() {
        let router = Router::new(vec![RouteRecord::new("/a", ViewId::About)]);
        assert_eq!(
            router.resolve("/b"),
            Err(RouteError::NoMatch("/b".to_string()))
        );
    }

    #[test]
    fn lists_concrete_paths() {
        let router = router();
        assert_eq!(
            router.paths(),
            vec![
                "/home/ollama",
                "/home/tags",
                "/home/online",
                "/chat",
                "/setting",
                "/about"
            ]
        );
    }
}
