use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::integrations::{ReleaseChecker, ReleaseItem};
use crate::utils::version::is_newer;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const RETRY_AFTER: Duration = Duration::from_secs(5 * 60);

/// Build and platform details shown on the about page.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub version: &'static str,
    pub build_hash: Option<String>,
    pub os: &'static str,
    pub arch: &'static str,
}

impl AppInfo {
    pub fn current() -> Self {
        Self {
            version: APP_VERSION,
            build_hash: option_env!("OLLAMA_DESK_BUILD_HASH").map(short_hash),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(7).collect()
}

#[derive(Debug, PartialEq)]
pub enum UpgradeCheck {
    Newer(ReleaseItem),
    Current,
    Failed,
}

/// Asks each channel in turn; the first one that answers decides.
pub async fn check_once(
    checkers: &[ReleaseChecker],
    owner: &str,
    repo: &str,
    current: &str,
) -> UpgradeCheck {
    let mut failed = false;

    for checker in checkers {
        let item = match checker.latest(owner, repo).await {
            Ok(Some(item)) => item,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("check app upgrade: {}", e);
                failed = true;
                continue;
            }
        };

        let newer = is_newer(&item.name, current).or_else(|| is_newer(&item.tag_name, current));
        return match newer {
            Some(true) => {
                log::info!(
                    "new app release {} on {} (running {})",
                    item.name,
                    checker.channel(),
                    current
                );
                UpgradeCheck::Newer(item)
            }
            Some(false) => UpgradeCheck::Current,
            None => {
                log::warn!("check app upgrade: unparsable release {:?}", item.name);
                UpgradeCheck::Current
            }
        };
    }

    if failed {
        UpgradeCheck::Failed
    } else {
        UpgradeCheck::Current
    }
}

/// Checks for a newer release of this application, retrying while every
/// channel fails.
pub fn spawn_app_upgrade_check(
    checkers: Vec<ReleaseChecker>,
    owner: String,
    repo: String,
    target: Arc<RwLock<Option<ReleaseItem>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match check_once(&checkers, &owner, &repo, APP_VERSION).await {
                UpgradeCheck::Newer(item) => {
                    *target.write() = Some(item);
                    return;
                }
                UpgradeCheck::Current => return,
                UpgradeCheck::Failed => sleep(RETRY_AFTER).await,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::ReleaseSource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RELEASES: &str = "/repos/jianggujin/ollama-desktop/releases";

    async fn channel(source: ReleaseSource, response: ResponseTemplate) -> (MockServer, ReleaseChecker) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES))
            .respond_with(response)
            .mount(&server)
            .await;
        let checker = ReleaseChecker::new(source, reqwest::Client::new()).with_api_base(server.uri());
        (server, checker)
    }

    fn release(name: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!([{ "name": name, "tag_name": name, "body": "notes" }]))
    }

    #[tokio::test]
    async fn newer_release_is_reported() {
        let (_server, github) = channel(ReleaseSource::Github, release("v9.0.0")).await;

        let result = check_once(&[github], "jianggujin", "ollama-desktop", "0.3.0").await;
        match result {
            UpgradeCheck::Newer(item) => assert_eq!(item.name, "v9.0.0"),
            other => panic!("expected a newer release, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn first_answering_channel_decides() {
        let (_down, github) = channel(ReleaseSource::Github, ResponseTemplate::new(500)).await;
        let (_up, gitee) = channel(ReleaseSource::Gitee, release("v0.3.0")).await;

        let result = check_once(&[github, gitee], "jianggujin", "ollama-desktop", "0.3.0").await;
        assert_eq!(result, UpgradeCheck::Current);
    }

    #[tokio::test]
    async fn all_channels_failing_is_a_failure() {
        let (_a, github) = channel(ReleaseSource::Github, ResponseTemplate::new(500)).await;
        let (_b, gitee) = channel(ReleaseSource::Gitee, ResponseTemplate::new(503)).await;

        let result = check_once(&[github, gitee], "jianggujin", "ollama-desktop", "0.3.0").await;
        assert_eq!(result, UpgradeCheck::Failed);
    }

    #[test]
    fn build_hash_is_shortened() {
        assert_eq!(short_hash("0123456789abcdef"), "0123456");
        assert_eq!(short_hash("abc"), "abc");
    }
}
