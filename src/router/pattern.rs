use std::collections::BTreeMap;

pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    /// `:name`, matches exactly one segment
    Param(String),
    /// `:name(.*)*`, matches zero or more trailing segments
    CatchAll(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(parse_segment)
            .collect();
        Self { segments }
    }

    pub fn is_catch_all(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::CatchAll(_)))
    }

    /// Matches the whole path. Returns the captured parameters on success.
    pub fn matches(&self, path: &[&str]) -> Option<Params> {
        let mut params = Params::new();
        let mut idx = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(text) => {
                    if path.get(idx) != Some(&text.as_str()) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Param(name) => {
                    let value = path.get(idx)?;
                    params.insert(name.clone(), (*value).to_string());
                    idx += 1;
                }
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), path[idx..].join("/"));
                    idx = path.len();
                }
            }
        }

        if idx == path.len() {
            Some(params)
        } else {
            None
        }
    }
}

fn parse_segment(raw: &str) -> Segment {
    let Some(param) = raw.strip_prefix(':') else {
        return Segment::Static(raw.to_string());
    };

    match param.split_once('(') {
        Some((name, regex)) if regex.starts_with(".*)") => Segment::CatchAll(name.to_string()),
        Some((name, _)) => Segment::Param(name.to_string()),
        None => Segment::Param(param.to_string()),
    }
}

/// Joins a child route path onto its parent. Absolute children replace the
/// parent path entirely.
pub fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return child.to_string();
    }
    match (parent.trim_end_matches('/'), child) {
        (p, "") => format!("{}/", p),
        (p, c) => format!("{}/{}", p, c),
    }
}
