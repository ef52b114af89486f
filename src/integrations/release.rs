use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("{channel} release request failed: {source}")]
    Request {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{channel} returned {status}")]
    Status {
        channel: &'static str,
        status: reqwest::StatusCode,
    },
}

/// One published release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub name: String,
    pub tag_name: String,
    pub body: String,
    pub url: String,
}

// GitHub sends `null` for an empty name or body.
#[derive(Debug, Deserialize)]
struct RawRelease {
    name: Option<String>,
    tag_name: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseSource {
    Github,
    Gitee,
}

impl ReleaseSource {
    pub fn channel(&self) -> &'static str {
        match self {
            ReleaseSource::Github => "github",
            ReleaseSource::Gitee => "gitee",
        }
    }

    fn default_api_base(&self) -> &'static str {
        match self {
            ReleaseSource::Github => "https://api.github.com",
            ReleaseSource::Gitee => "https://gitee.com/api/v5",
        }
    }

    fn releases_path(&self, owner: &str, repo: &str, page: u32, per_page: u32) -> String {
        match self {
            ReleaseSource::Github => format!(
                "/repos/{}/{}/releases?page={}&per_page={}",
                owner, repo, page, per_page
            ),
            ReleaseSource::Gitee => format!(
                "/repos/{}/{}/releases?page={}&per_page={}&direction=desc",
                owner, repo, page, per_page
            ),
        }
    }

    /// Public page of a tagged release.
    pub fn tag_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        match self {
            ReleaseSource::Github => {
                format!("https://github.com/{}/{}/releases/tag/{}", owner, repo, tag)
            }
            ReleaseSource::Gitee => {
                format!("https://gitee.com/{}/{}/releases/tag/{}", owner, repo, tag)
            }
        }
    }
}

/// Reads release listings from one channel.
#[derive(Clone)]
pub struct ReleaseChecker {
    source: ReleaseSource,
    api_base: String,
    http: reqwest::Client,
}

impl ReleaseChecker {
    pub fn new(source: ReleaseSource, http: reqwest::Client) -> Self {
        Self {
            source,
            api_base: source.default_api_base().to_string(),
            http,
        }
    }

    #[cfg(test)]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn channel(&self) -> &'static str {
        self.source.channel()
    }

    pub async fn releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ReleaseItem>, ReleaseError> {
        let channel = self.channel();
        let url = format!(
            "{}{}",
            self.api_base,
            self.source.releases_path(owner, repo, page, per_page)
        );

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ReleaseError::Request { channel, source })?;

        if !response.status().is_success() {
            return Err(ReleaseError::Status {
                channel,
                status: response.status(),
            });
        }

        let raw: Vec<RawRelease> = response
            .json()
            .await
            .map_err(|source| ReleaseError::Request { channel, source })?;

        Ok(raw
            .into_iter()
            .map(|release| {
                let tag_name = release.tag_name.unwrap_or_default();
                ReleaseItem {
                    url: self.source.tag_url(owner, repo, &tag_name),
                    name: release.name.unwrap_or_default(),
                    body: release.body.unwrap_or_default(),
                    tag_name,
                }
            })
            .collect())
    }

    /// Most recent release, `None` when the repository has none.
    pub async fn latest(&self, owner: &str, repo: &str) -> Result<Option<ReleaseItem>, ReleaseError> {
        let mut items = self.releases(owner, repo, 1, 1).await?;
        Ok(items.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn github_latest_rewrites_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/ollama/ollama/releases"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "name": "v0.6.0",
                    "tag_name": "v0.6.0",
                    "body": null,
                    "html_url": "https://example.invalid"
                }
            ])))
            .mount(&server)
            .await;

        let checker = ReleaseChecker::new(ReleaseSource::Github, reqwest::Client::new())
            .with_api_base(server.uri());
        let item = checker
            .latest("ollama", "ollama")
            .await
            .expect("request")
            .expect("release");

        assert_eq!(item.name, "v0.6.0");
        assert_eq!(item.body, "");
        assert_eq!(
            item.url,
            "https://github.com/ollama/ollama/releases/tag/v0.6.0"
        );
    }

    #[tokio::test]
    async fn gitee_asks_for_descending_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/jianggujin/ollama-desktop/releases"))
            .and(query_param("direction", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "v1.2.0", "tag_name": "v1.2.0", "body": "notes" }
            ])))
            .mount(&server)
            .await;

        let checker = ReleaseChecker::new(ReleaseSource::Gitee, reqwest::Client::new())
            .with_api_base(server.uri());
        let items = checker
            .releases("jianggujin", "ollama-desktop", 1, 10)
            .await
            .expect("request");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].body, "notes");
        assert_eq!(
            items[0].url,
            "https://gitee.com/jianggujin/ollama-desktop/releases/tag/v1.2.0"
        );
    }

    #[tokio::test]
    async fn empty_listing_has_no_latest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let checker = ReleaseChecker::new(ReleaseSource::Github, reqwest::Client::new())
            .with_api_base(server.uri());
        assert_eq!(checker.latest("a", "b").await.expect("request"), None);
    }

    #[tokio::test]
    async fn rate_limit_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let checker = ReleaseChecker::new(ReleaseSource::Github, reqwest::Client::new())
            .with_api_base(server.uri());
        assert!(matches!(
            checker.latest("a", "b").await,
            Err(ReleaseError::Status { channel: "github", .. })
        ));
    }
}
