pub mod env;
pub mod host;
pub mod install;
pub mod ollama;
pub mod release;

pub use host::OllamaHost;
pub use install::OllamaInstall;
pub use ollama::{ModelShow, OllamaClient, OllamaError, OllamaModel, PullProgress, RunningModel};
pub use release::{ReleaseChecker, ReleaseItem, ReleaseSource};

use anyhow::{Context, Result};
use std::time::Duration;

/// HTTP client for requests leaving the machine (release channels).
/// `proxy` is a full proxy URL, credentials included; empty means direct.
pub fn build_http_client(proxy: &str, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

    let proxy = proxy.trim();
    if !proxy.is_empty() {
        let proxy = reqwest::Proxy::all(proxy)
            .with_context(|| format!("Invalid proxy URL: {}", proxy))?;
        builder = builder.proxy(proxy);
    }

    builder.build().context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_proxy() {
        assert!(build_http_client("", Duration::from_secs(30)).is_ok());
        assert!(build_http_client("http://127.0.0.1:7890", Duration::from_secs(30)).is_ok());
        assert!(build_http_client("::not a url::", Duration::from_secs(30)).is_err());
    }
}
