use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?(?:-?([0-9a-z][0-9a-z.-]*))?$")
            .expect("valid version regex")
    })
}

/// Lenient version parsing for release names and server versions such as
/// `v0.5.7`, `0.5` or `0.6.0-rc1`. Missing minor/patch parts become zero.
/// A fourth number and anything after `+` are kept as build metadata, which
/// does not take part in [`is_newer`].
pub fn parse_version(raw: &str) -> Option<Version> {
    let lowered = raw.trim().to_lowercase();
    let (core, build) = match lowered.split_once('+') {
        Some((core, build)) => (core, Some(build)),
        None => (lowered.as_str(), None),
    };
    let caps = version_regex().captures(core)?;

    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let mut version = Version::new(part(1), part(2), part(3));

    if let Some(pre) = caps.get(5) {
        let pre = pre.as_str().trim_matches(|c| c == '.' || c == '-');
        if !pre.is_empty() {
            version.pre = Prerelease::new(pre).ok()?;
        }
    }

    let build: Vec<&str> = caps
        .get(4)
        .map(|m| m.as_str())
        .into_iter()
        .chain(build.filter(|b| !b.is_empty()))
        .collect();
    if !build.is_empty() {
        match BuildMetadata::new(&build.join(".")) {
            Ok(meta) => version.build = meta,
            Err(_) => log::debug!("ignoring build metadata in {:?}", raw),
        }
    }
    Some(version)
}

/// `Some(true)` when `latest` is strictly newer than `current`, `None` when
/// either side cannot be parsed. Build metadata is ignored.
pub fn is_newer(latest: &str, current: &str) -> Option<bool> {
    Some(is_newer_version(&parse_version(latest)?, &parse_version(current)?))
}

pub fn is_newer_version(latest: &Version, current: &Version) -> bool {
    latest.cmp_precedence(current).is_gt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_shapes() {
        assert_eq!(parse_version("0.5.7"), Some(Version::new(0, 5, 7)));
        assert_eq!(parse_version(" V0.5.7 "), Some(Version::new(0, 5, 7)));
        assert_eq!(parse_version("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_version("3"), Some(Version::new(3, 0, 0)));

        let pre = parse_version("v0.6.0-rc1").expect("prerelease");
        assert_eq!(pre.pre.as_str(), "rc1");
    }

    #[test]
    fn build_metadata_is_not_a_prerelease() {
        let build = parse_version("0.5.7+abc").expect("build metadata");
        assert!(build.pre.is_empty());
        assert_eq!(build.build.as_str(), "abc");

        let four = parse_version("0.5.7.1").expect("four parts");
        assert!(four.pre.is_empty());
        assert_eq!((four.major, four.minor, four.patch), (0, 5, 7));

        assert_eq!(is_newer("0.5.7", "0.5.7+abc"), Some(false));
        assert_eq!(is_newer("0.5.7", "0.5.7.1"), Some(false));
        assert_eq!(is_newer("0.5.8", "0.5.7.1"), Some(true));
        assert_eq!(is_newer("0.5.7+abc", "0.5.7"), Some(false));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("latest"), None);
        assert_eq!(parse_version("ollama version 0.5.7"), None);
    }

    #[test]
    fn compares_versions() {
        assert_eq!(is_newer("v0.6.0", "0.5.7"), Some(true));
        assert_eq!(is_newer("v0.5.7", "0.5.7"), Some(false));
        assert_eq!(is_newer("v0.6.0-rc1", "0.6.0"), Some(false));
        assert_eq!(is_newer("0.10.0", "0.9.9"), Some(true));
        assert_eq!(is_newer("nope", "0.5.7"), None);
    }
}
