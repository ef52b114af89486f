use serde::{Deserialize, Serialize};

use super::RouteRecord;

/// Landing page every redirect eventually settles on.
pub const DEFAULT_PATH: &str = "/home/ollama";

/// Identifiers for the views a route can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewId {
    Layout,
    Home,
    Ollama,
    Tags,
    Online,
    About,
}

impl ViewId {
    pub fn as_str(&self) -> &str {
        match self {
            ViewId::Layout => "Layout",
            ViewId::Home => "Home",
            ViewId::Ollama => "Ollama",
            ViewId::Tags => "Tags",
            ViewId::Online => "Online",
            ViewId::About => "About",
        }
    }

    #[cfg(test)]
    pub fn all() -> Vec<ViewId> {
        vec![
            ViewId::Layout,
            ViewId::Home,
            ViewId::Ollama,
            ViewId::Tags,
            ViewId::Online,
            ViewId::About,
        ]
    }
}

/// The application's route table.
///
/// `/chat` and `/setting` share the about view until they get their own.
pub fn app_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("", ViewId::Layout)
            .with_redirect("/home")
            .with_children(vec![
                RouteRecord::new("home", ViewId::Home)
                    .with_redirect(DEFAULT_PATH)
                    .with_children(vec![
                        RouteRecord::new("ollama", ViewId::Ollama),
                        RouteRecord::new("tags", ViewId::Tags),
                        RouteRecord::new("online", ViewId::Online),
                    ]),
                RouteRecord::new("chat", ViewId::About),
                RouteRecord::new("setting", ViewId::About),
                RouteRecord::new("about", ViewId::About),
            ]),
        RouteRecord::redirect("/:pathMatch(.*)*", "/home"),
    ]
}
