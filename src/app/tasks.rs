use chrono::Local;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::state::{MonitorState, MonitorStatus};
use super::Config;
use crate::integrations::{ModelShow, OllamaClient, OllamaModel, PullProgress, RunningModel};
use crate::store::StatusStore;

pub const NOT_RUNNING: &str = "Ollama is not running";

#[derive(Debug, Clone, Default)]
pub struct ModelsData {
    pub models: Vec<OllamaModel>,
    pub running: Vec<RunningModel>,
}

/// Refreshes the local and running model lists once.
pub async fn refresh_models(
    client: &OllamaClient,
    store: &StatusStore,
    target: &RwLock<MonitorState<ModelsData>>,
) {
    if !store.started() {
        let mut state = target.write();
        state.status = MonitorStatus::Error(NOT_RUNNING.to_string());
        state.data = None;
        return;
    }

    let fetched = async {
        let models = client.list_models().await?;
        let running = client.list_running().await?;
        Ok::<_, crate::integrations::OllamaError>(ModelsData { models, running })
    }
    .await;

    let mut state = target.write();
    match fetched {
        Ok(data) => {
            state.data = Some(data);
            state.status = MonitorStatus::Ready;
            state.last_updated = Some(Local::now());
        }
        Err(e) => {
            log::warn!("Failed to list models: {}", e);
            state.status = MonitorStatus::Error(e.to_string());
        }
    }
}

pub fn spawn_models_task(
    client: OllamaClient,
    store: StatusStore,
    target: Arc<RwLock<MonitorState<ModelsData>>>,
    config: Arc<RwLock<Config>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            refresh_models(&client, &store, &target).await;

            let interval = config.read().ollama.models_refresh_interval_ms.max(500);
            sleep(Duration::from_millis(interval)).await;
        }
    })
}

/// Progress of the current, or last finished, model pull.
#[derive(Debug, Clone, Default)]
pub struct PullState {
    pub model: String,
    pub progress: PullProgress,
    pub done: bool,
    pub error: Option<String>,
}

/// `/api/show` result for the model picked on the models page.
#[derive(Debug, Clone)]
pub struct ModelDetail {
    pub name: String,
    pub state: MonitorState<ModelShow>,
}

/// Claims the pull slot for `model`. Returns false while another pull is
/// still running.
pub fn begin_pull(target: &RwLock<Option<PullState>>, model: &str) -> bool {
    let mut state = target.write();
    if state.as_ref().is_some_and(|pull| !pull.done) {
        return false;
    }
    *state = Some(PullState {
        model: model.to_string(),
        ..PullState::default()
    });
    true
}

/// Runs a pull claimed with [`begin_pull`], mirroring progress into `target`.
pub async fn pull_model(
    client: &OllamaClient,
    model: &str,
    target: &RwLock<Option<PullState>>,
) -> bool {
    log::info!("Pulling model {}", model);
    let result = client
        .pull(model, |progress| {
            log::debug!("pull {}: {}", model, progress.status);
            if let Some(pull) = target.write().as_mut() {
                pull.progress = progress;
            }
        })
        .await;

    let mut state = target.write();
    let pull = state.get_or_insert_with(|| PullState {
        model: model.to_string(),
        ..PullState::default()
    });
    pull.done = true;
    match result {
        Ok(()) => {
            log::info!("Pulled model {}", model);
            true
        }
        Err(e) => {
            log::error!("Failed to pull {}: {}", model, e);
            pull.error = Some(e.to_string());
            false
        }
    }
}

/// Loads `/api/show` for `model` into `target`.
pub async fn load_detail(client: &OllamaClient, model: &str, target: &RwLock<Option<ModelDetail>>) {
    *target.write() = Some(ModelDetail {
        name: model.to_string(),
        state: MonitorState::new(),
    });

    let result = client.show(model).await;

    let mut guard = target.write();
    // Another model was picked while this one loaded.
    let Some(detail) = guard.as_mut().filter(|d| d.name == model) else {
        return;
    };
    match result {
        Ok(show) => {
            detail.state.data = Some(show);
            detail.state.status = MonitorStatus::Ready;
            detail.state.last_updated = Some(Local::now());
        }
        Err(e) => {
            log::warn!("Failed to show model {}: {}", model, e);
            detail.state.status = MonitorStatus::Error(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn stopped_service_reports_not_running() {
        let store = StatusStore::new();
        let client = OllamaClient::with_http("http://127.0.0.1:9", reqwest::Client::new());
        let target = RwLock::new(MonitorState::new());

        refresh_models(&client, &store, &target).await;

        let state = target.read();
        assert!(matches!(&state.status, MonitorStatus::Error(msg) if msg == NOT_RUNNING));
        assert!(state.data.is_none());
    }

    #[tokio::test]
    async fn started_service_lists_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{
                    "name": "llama3:8b",
                    "size": 4_661_224_676u64,
                    "details": { "family": "llama", "parameter_size": "8.0B" }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": [] })))
            .mount(&server)
            .await;

        let store = StatusStore::new();
        store.set_started(true);
        let client = OllamaClient::with_http(server.uri(), reqwest::Client::new());
        let target = RwLock::new(MonitorState::new());

        refresh_models(&client, &store, &target).await;

        let state = target.read();
        assert!(matches!(state.status, MonitorStatus::Ready));
        let data = state.data.as_ref().expect("models loaded");
        assert_eq!(data.models.len(), 1);
        assert_eq!(data.models[0].name, "llama3:8b");
        assert!(data.running.is_empty());
        assert!(state.last_updated.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = StatusStore::new();
        store.set_started(true);
        let client = OllamaClient::with_http(server.uri(), reqwest::Client::new());
        let target = RwLock::new(MonitorState {
            status: MonitorStatus::Ready,
            data: Some(ModelsData::default()),
            last_updated: None,
        });

        refresh_models(&client, &store, &target).await;

        let state = target.read();
        assert!(matches!(state.status, MonitorStatus::Error(_)));
        assert!(state.data.is_some());
    }

    #[test]
    fn one_pull_at_a_time() {
        let target = RwLock::new(None);
        assert!(begin_pull(&target, "qwen:0.5b"));
        assert!(!begin_pull(&target, "llama3:8b"));
        assert_eq!(target.read().as_ref().map(|p| p.model.as_str()), Some("qwen:0.5b"));

        if let Some(pull) = target.write().as_mut() {
            pull.done = true;
        }
        assert!(begin_pull(&target, "llama3:8b"));
    }

    #[tokio::test]
    async fn pull_records_last_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"status\":\"pulling manifest\"}\n{\"status\":\"success\"}\n",
            ))
            .mount(&server)
            .await;
        let client = OllamaClient::with_http(server.uri(), reqwest::Client::new());
        let target = RwLock::new(None);

        assert!(begin_pull(&target, "qwen:0.5b"));
        assert!(pull_model(&client, "qwen:0.5b", &target).await);

        let state = target.read();
        let pull = state.as_ref().expect("pull state");
        assert!(pull.done);
        assert_eq!(pull.progress.status, "success");
        assert!(pull.error.is_none());
    }

    #[tokio::test]
    async fn failed_pull_keeps_the_error() {
        let client = OllamaClient::with_http("http://127.0.0.1:9", reqwest::Client::new());
        let target = RwLock::new(None);

        assert!(begin_pull(&target, "qwen:0.5b"));
        assert!(!pull_model(&client, "qwen:0.5b", &target).await);

        let state = target.read();
        let pull = state.as_ref().expect("pull state");
        assert!(pull.done);
        assert!(pull.error.is_some());
        drop(state);
        assert!(begin_pull(&target, "qwen:0.5b"), "a failed pull frees the slot");
    }

    #[tokio::test]
    async fn detail_loads_show_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/show"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "details": { "family": "qwen2", "parameter_size": "494.03M" }
            })))
            .mount(&server)
            .await;
        let client = OllamaClient::with_http(server.uri(), reqwest::Client::new());
        let target = RwLock::new(None);

        load_detail(&client, "qwen:0.5b", &target).await;

        let detail = target.read();
        let detail = detail.as_ref().expect("detail");
        assert_eq!(detail.name, "qwen:0.5b");
        assert!(matches!(detail.state.status, MonitorStatus::Ready));
        let show = detail.state.data.as_ref().expect("show data");
        assert_eq!(show.details.parameter_size, "494.03M");
    }
}
