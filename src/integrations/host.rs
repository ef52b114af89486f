use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "11434";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("invalid port {port:?} specified in OLLAMA_HOST, using {fallback}")]
    InvalidPort { port: String, fallback: OllamaHost },
}

/// Where the Ollama HTTP API listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaHost {
    pub scheme: String,
    pub host: String,
    pub port: String,
}

impl Default for OllamaHost {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
        }
    }
}

impl OllamaHost {
    /// Reads `OLLAMA_HOST` the way the ollama CLI does. An out of range port
    /// is logged and replaced by the scheme's default port.
    pub fn from_env() -> Self {
        let raw = std::env::var("OLLAMA_HOST").unwrap_or_default();
        match parse_ollama_host(&raw) {
            Ok(host) => host,
            Err(err) => {
                log::warn!("{}", err);
                match err {
                    HostError::InvalidPort { fallback, .. } => fallback,
                }
            }
        }
    }

    pub fn base_url(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("{}://{}:{}", self.scheme, host, self.port)
    }
}

impl fmt::Display for OllamaHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Strips surrounding whitespace and quotes from an environment value.
pub fn clean_env_value(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

pub fn parse_ollama_host(raw: &str) -> Result<OllamaHost, HostError> {
    let value = clean_env_value(raw);

    let (scheme, hostport, default_port) = match value.split_once("://") {
        None => ("http", value, DEFAULT_PORT),
        Some(("http", rest)) => ("http", rest, "80"),
        Some(("https", rest)) => ("https", rest, "443"),
        Some((scheme, rest)) => (scheme, rest, DEFAULT_PORT),
    };
    let hostport = hostport.trim_end_matches('/');

    let (host, port) = match split_host_port(hostport) {
        Some(("", port)) => (DEFAULT_HOST.to_string(), port.to_string()),
        Some((host, port)) => (host.to_string(), port.to_string()),
        None => {
            let bare = hostport.trim_start_matches('[').trim_end_matches(']');
            let host = if let Ok(ip) = bare.parse::<IpAddr>() {
                ip.to_string()
            } else if !hostport.is_empty() {
                hostport.to_string()
            } else {
                DEFAULT_HOST.to_string()
            };
            (host, default_port.to_string())
        }
    };

    let valid = port.parse::<u32>().map(|p| p <= 65535).unwrap_or(false);
    if !valid {
        return Err(HostError::InvalidPort {
            port,
            fallback: OllamaHost {
                scheme: scheme.to_string(),
                host,
                port: default_port.to_string(),
            },
        });
    }

    Ok(OllamaHost {
        scheme: scheme.to_string(),
        host,
        port,
    })
}

/// `host:port` or `[v6]:port`. A bare IPv6 address has no port.
fn split_host_port(hostport: &str) -> Option<(&str, &str)> {
    if let Some(rest) = hostport.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        return Some((host, port));
    }

    let (host, port) = hostport.rsplit_once(':')?;
    if host.contains(':') {
        return None;
    }
    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(scheme: &str, host: &str, port: &str) -> OllamaHost {
        OllamaHost {
            scheme: scheme.into(),
            host: host.into(),
            port: port.into(),
        }
    }

    #[test]
    fn empty_means_local_default() {
        assert_eq!(parse_ollama_host(""), Ok(OllamaHost::default()));
        assert_eq!(parse_ollama_host("  \"\"  "), Ok(OllamaHost::default()));
        assert_eq!(OllamaHost::default().base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn host_and_port_variants() {
        assert_eq!(
            parse_ollama_host("0.0.0.0:8080"),
            Ok(host("http", "0.0.0.0", "8080"))
        );
        assert_eq!(
            parse_ollama_host("example.com"),
            Ok(host("http", "example.com", "11434"))
        );
        assert_eq!(
            parse_ollama_host("https://example.com/"),
            Ok(host("https", "example.com", "443"))
        );
        assert_eq!(
            parse_ollama_host("http://example.com"),
            Ok(host("http", "example.com", "80"))
        );
        assert_eq!(
            parse_ollama_host("'http://10.0.0.2:11500'"),
            Ok(host("http", "10.0.0.2", "11500"))
        );
    }

    #[test]
    fn empty_host_with_port_uses_loopback() {
        let parsed = parse_ollama_host(":11434").expect("port only");
        assert_eq!(parsed, host("http", "127.0.0.1", "11434"));
        assert_eq!(parsed.base_url(), "http://127.0.0.1:11434");
        assert!(reqwest::Url::parse(&parsed.base_url()).is_ok());

        assert_eq!(
            parse_ollama_host("http://:8080"),
            Ok(host("http", "127.0.0.1", "8080"))
        );
        assert_eq!(
            parse_ollama_host("[]:9000"),
            Ok(host("http", "127.0.0.1", "9000"))
        );
    }

    #[test]
    fn ipv6_hosts() {
        assert_eq!(
            parse_ollama_host("[::1]:11434"),
            Ok(host("http", "::1", "11434"))
        );
        let bare = parse_ollama_host("[::1]").expect("bare v6");
        assert_eq!(bare, host("http", "::1", "11434"));
        assert_eq!(bare.base_url(), "http://[::1]:11434");
    }

    #[test]
    fn invalid_port_falls_back() {
        let err = parse_ollama_host("example.com:99999").expect_err("bad port");
        assert_eq!(
            err,
            HostError::InvalidPort {
                port: "99999".into(),
                fallback: host("http", "example.com", "11434"),
            }
        );

        let err = parse_ollama_host("https://example.com:").expect_err("empty port");
        match err {
            HostError::InvalidPort { fallback, .. } => assert_eq!(fallback.port, "443"),
        }
    }
}
