use chrono::{DateTime, Local};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use super::host::OllamaHost;
use crate::utils::format::{format_bytes, params_from_model_name};

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("ollama returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("starting the Ollama app is not supported on {0}")]
    Unsupported(&'static str),
    #[error("pull {model} failed: {message}")]
    Pull { model: String, message: String },
}

/// Pulls stream for as long as the download takes.
const PULL_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

/// A model available locally (`/api/tags`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaModel {
    pub name: String,
    pub size_bytes: u64,
    pub size_display: String,
    pub params_display: String,
    pub family: Option<String>,
    pub quantization: Option<String>,
    pub modified: Option<DateTime<Local>>,
}

/// A model currently loaded in memory (`/api/ps`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningModel {
    pub name: String,
    pub size_bytes: u64,
    pub size_display: String,
    pub vram_bytes: u64,
    pub processor: String, // "100% GPU", "100% CPU" or "48%/52% CPU/GPU"
    pub until: Option<DateTime<Local>>,
}

/// `/api/show` output for one model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelShow {
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub details: ShowDetails,
    #[serde(default)]
    pub model_info: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowDetails {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub parameter_size: String,
    #[serde(default)]
    pub quantization_level: String,
}

/// One line of the `/api/pull` progress stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PullProgress {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PullProgress {
    /// Percentage of the current layer, when the server reports sizes.
    pub fn percent(&self) -> Option<u16> {
        match (self.completed, self.total) {
            (Some(done), Some(total)) if total > 0 => {
                Some((done.min(total) * 100 / total) as u16)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ModelDetails {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    parameter_size: Option<String>,
    #[serde(default)]
    quantization_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    modified_at: Option<DateTime<Local>>,
    #[serde(default)]
    details: Option<ModelDetails>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct ProcessEntry {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    size_vram: u64,
    #[serde(default)]
    expires_at: Option<DateTime<Local>>,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    models: Vec<ProcessEntry>,
}

/// Client for the local Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaClient {
    base: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(host: &OllamaHost, timeout: Duration) -> Result<Self, OllamaError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(OllamaError::Client)?;
        Ok(Self::with_http(host.base_url(), http))
    }

    pub fn with_http(base: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Succeeds when the server answers its root endpoint.
    pub async fn heartbeat(&self) -> Result<(), OllamaError> {
        self.get("/").await.map(|_| ())
    }

    pub async fn version(&self) -> Result<String, OllamaError> {
        let response: VersionResponse = self.get_json("/api/version").await?;
        Ok(response.version)
    }

    pub async fn list_models(&self) -> Result<Vec<OllamaModel>, OllamaError> {
        let response: TagsResponse = self.get_json("/api/tags").await?;
        Ok(response.models.into_iter().map(into_model).collect())
    }

    pub async fn list_running(&self) -> Result<Vec<RunningModel>, OllamaError> {
        let response: ProcessResponse = self.get_json("/api/ps").await?;
        Ok(response.models.into_iter().map(into_running).collect())
    }

    pub async fn delete(&self, model: &str) -> Result<(), OllamaError> {
        let url = self.url("/api/delete");
        let request = self
            .http
            .delete(&url)
            .json(&serde_json::json!({ "model": model }));
        self.send(request, url).await.map(|_| ())
    }

    pub async fn show(&self, model: &str) -> Result<ModelShow, OllamaError> {
        let url = self.url("/api/show");
        let request = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "model": model }));
        self.send(request, url.clone())
            .await?
            .json()
            .await
            .map_err(|source| OllamaError::Request { url, source })
    }

    /// Downloads `model`, calling `on_progress` for every status line the
    /// server streams back. An `error` line ends the pull with an error.
    pub async fn pull(
        &self,
        model: &str,
        mut on_progress: impl FnMut(PullProgress),
    ) -> Result<(), OllamaError> {
        let url = self.url("/api/pull");
        let request = self
            .http
            .post(&url)
            .timeout(PULL_TIMEOUT)
            .json(&serde_json::json!({ "model": model, "stream": true }));
        let response = self.send(request, url.clone()).await?;

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| OllamaError::Request {
                url: url.clone(),
                source,
            })?;
            pending.extend_from_slice(&chunk);

            // Lines may be split across chunks.
            while let Some(end) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=end).collect();
                handle_pull_line(model, &line, &mut on_progress)?;
            }
        }
        handle_pull_line(model, &pending, &mut on_progress)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: String,
    ) -> Result<reqwest::Response, OllamaError> {
        let response = request
            .send()
            .await
            .map_err(|source| OllamaError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(OllamaError::Status {
                url,
                status: response.status(),
            });
        }
        Ok(response)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, OllamaError> {
        let url = self.url(path);
        self.send(self.http.get(&url), url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, OllamaError> {
        let url = self.url(path);
        self.get(path)
            .await?
            .json()
            .await
            .map_err(|source| OllamaError::Request { url, source })
    }
}

fn handle_pull_line(
    model: &str,
    line: &[u8],
    on_progress: &mut impl FnMut(PullProgress),
) -> Result<(), OllamaError> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let progress: PullProgress =
        serde_json::from_str(line).map_err(|e| OllamaError::Pull {
            model: model.to_string(),
            message: format!("unreadable progress {:?}: {}", line, e),
        })?;
    if let Some(message) = progress.error {
        return Err(OllamaError::Pull {
            model: model.to_string(),
            message,
        });
    }
    on_progress(progress);
    Ok(())
}

fn into_model(entry: TagEntry) -> OllamaModel {
    let details = entry.details.unwrap_or(ModelDetails {
        family: None,
        parameter_size: None,
        quantization_level: None,
    });
    let params_display = details
        .parameter_size
        .filter(|s| !s.is_empty())
        .or_else(|| params_from_model_name(&entry.name))
        .unwrap_or_else(|| "-".to_string());

    OllamaModel {
        size_display: format_bytes(entry.size),
        size_bytes: entry.size,
        params_display,
        family: details.family,
        quantization: details.quantization_level,
        modified: entry.modified_at,
        name: entry.name,
    }
}

fn into_running(entry: ProcessEntry) -> RunningModel {
    RunningModel {
        size_display: format_bytes(entry.size),
        size_bytes: entry.size,
        vram_bytes: entry.size_vram,
        processor: processor_split(entry.size, entry.size_vram),
        until: entry.expires_at,
        name: entry.name,
    }
}

/// Same wording as `ollama ps`.
fn processor_split(size: u64, vram: u64) -> String {
    if vram == 0 {
        return "100% CPU".to_string();
    }
    if vram >= size {
        return "100% GPU".to_string();
    }
    let gpu = (vram as f64 * 100.0 / size as f64).round() as u64;
    format!("{}%/{}% CPU/GPU", 100 - gpu, gpu)
}
