use std::fmt;

/// A navigation target split into its path, query and hash parts.
///
/// The path is always normalized: it starts with `/`, has no empty
/// segments and no trailing slash (except for the root itself).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
    pub hash: Option<String>,
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        let (rest, hash) = match raw.split_once('#') {
            Some((rest, hash)) => (rest, non_empty(hash)),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, non_empty(query)),
            None => (rest, None),
        };

        Self {
            path: normalize_path(path),
            query,
            hash,
        }
    }

    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Keeps `other`'s path but inherits query and hash from `self` where
    /// `other` has none. Used when following a redirect.
    pub fn redirected_to(&self, other: Location) -> Location {
        Location {
            path: other.path,
            query: other.query.or_else(|| self.query.clone()),
            hash: other.hash.or_else(|| self.hash.clone()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(hash) = &self.hash {
            write!(f, "#{}", hash)?;
        }
        Ok(())
    }
}

pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_slashes() {
        assert_eq!(Location::parse("").path, "/");
        assert_eq!(Location::parse("/").path, "/");
        assert_eq!(Location::parse("home//tags/").path, "/home/tags");
        assert_eq!(Location::parse("  /about  ").path, "/about");
    }

    #[test]
    fn splits_query_and_hash() {
        let location = Location::parse("/home/tags?sort=size#top");
        assert_eq!(location.path, "/home/tags");
        assert_eq!(location.query.as_deref(), Some("sort=size"));
        assert_eq!(location.hash.as_deref(), Some("top"));
        assert_eq!(location.to_string(), "/home/tags?sort=size#top");

        let location = Location::parse("/chat#?");
        assert_eq!(location.path, "/chat");
        assert_eq!(location.query, None);
        assert_eq!(location.hash.as_deref(), Some("?"));
    }

    #[test]
    fn redirect_inherits_query() {
        let from = Location::parse("/missing?x=1");
        let to = from.redirected_to(Location::parse("/home"));
        assert_eq!(to.to_string(), "/home?x=1");
    }
}
