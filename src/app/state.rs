use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use super::heartbeat::Heartbeat;
use super::nav::{self, HomeTab, Section};
use super::tasks::{
    begin_pull, load_detail, pull_model, refresh_models, spawn_models_task, ModelDetail,
    ModelsData, PullState,
};
use super::upgrade::{spawn_app_upgrade_check, AppInfo};
use super::Config;
use crate::integrations::env::{ollama_env_vars, OllamaEnvVar};
use crate::integrations::{
    build_http_client, OllamaClient, OllamaInstall, ReleaseChecker, ReleaseItem, ReleaseSource,
};
use crate::router::{app_routes, Navigator, Router};
use crate::store::{StatusField, StatusStore};
use crate::ui::views::ViewRegistry;

const PAGE_ROWS: i32 = 10;
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum MonitorStatus {
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct MonitorState<T> {
    pub status: MonitorStatus,
    pub data: Option<T>,
    pub last_updated: Option<DateTime<Local>>,
}

impl<T> MonitorState<T> {
    pub fn new() -> Self {
        Self {
            status: MonitorStatus::Loading,
            data: None,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Path,
    Pull,
}

/// Line editor shown in the footer.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// One-line message for the footer.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub error: bool,
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub config_path: PathBuf,
    pub navigator: Navigator,
    pub views: ViewRegistry,

    pub store: StatusStore,
    pub heartbeat: Arc<Heartbeat>,
    pub models: Arc<RwLock<MonitorState<ModelsData>>>,
    pub app_release: Arc<RwLock<Option<ReleaseItem>>>,
    pub app_info: AppInfo,
    pub env_vars: Vec<OllamaEnvVar>,
    pub pull: Arc<RwLock<Option<PullState>>>,
    pub detail: Arc<RwLock<Option<ModelDetail>>>,
    starting: Arc<AtomicBool>,

    // UI state
    pub prompt: Option<Prompt>,
    pub notice: Arc<RwLock<Option<Notice>>>,
    pub selected_model: usize,
    pub pending_delete: Option<String>,
    /// Largest scroll offset the page on screen can use; set while rendering.
    pub scroll_limit: AtomicU16,
}

impl AppState {
    pub fn new(
        config: Arc<RwLock<Config>>,
        config_path: PathBuf,
        status_tx: UnboundedSender<StatusField>,
    ) -> Result<Self> {
        let cfg = config.read().clone();

        let router = Arc::new(Router::new(app_routes()));
        let navigator = Navigator::new(router, "/").context("Route table has no landing page")?;
        let mut views = ViewRegistry::with_defaults();
        views.load_chain(&navigator.current().matched);

        let store = StatusStore::new();
        store.subscribe(move |field, status| {
            log::debug!("status {} changed: {:?}", field.as_str(), status);
            // The receiver is gone once the UI loop has exited.
            let _ = status_tx.send(field);
        });

        let host = cfg.ollama.resolve_host();
        log::info!("Ollama host {}", host);
        let client = OllamaClient::new(&host, cfg.ollama.request_timeout())
            .context("Failed to create Ollama client")?;
        let http = build_http_client(
            &cfg.proxy.url,
            Duration::from_secs(cfg.release.timeout_seconds.max(1)),
        )?;

        let heartbeat = Arc::new(Heartbeat::new(
            client.clone(),
            OllamaInstall::new(cfg.ollama.executable.clone(), PROBE_TIMEOUT),
            ReleaseChecker::new(cfg.release.channel, http.clone()),
            cfg.release.owner.clone(),
            cfg.release.repo.clone(),
            store.clone(),
        ));
        heartbeat.spawn(Arc::clone(&config));

        let models = Arc::new(RwLock::new(MonitorState::new()));
        spawn_models_task(client, store.clone(), Arc::clone(&models), Arc::clone(&config));

        let app_release = Arc::new(RwLock::new(None));
        if cfg.release.check_app_upgrade {
            let checkers = [ReleaseSource::Github, ReleaseSource::Gitee]
                .into_iter()
                .map(|source| ReleaseChecker::new(source, http.clone()))
                .collect();
            spawn_app_upgrade_check(
                checkers,
                cfg.release.app_owner.clone(),
                cfg.release.app_repo.clone(),
                Arc::clone(&app_release),
            );
        }

        Ok(Self {
            config,
            config_path,
            navigator,
            views,

            store,
            heartbeat,
            models,
            app_release,
            app_info: AppInfo::current(),
            env_vars: ollama_env_vars(),
            pull: Arc::new(RwLock::new(None)),
            detail: Arc::new(RwLock::new(None)),
            starting: Arc::new(AtomicBool::new(false)),

            prompt: None,
            notice: Arc::new(RwLock::new(None)),
            selected_model: 0,
            pending_delete: None,
            scroll_limit: AtomicU16::new(u16::MAX),
        })
    }

    pub async fn handle_event(&mut self, event: CrosstermEvent) -> Result<bool> {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                self.handle_key_event(key).await
            }
            _ => Ok(true),
        }
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        // Handle Ctrl+C to quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(false);
        }

        if self.prompt.is_some() {
            self.handle_prompt(key);
            return Ok(true);
        }

        // A delete waits for a second `d`; anything else cancels it.
        let pending_delete = self.pending_delete.take();

        if key.modifiers.contains(KeyModifiers::ALT) {
            match key.code {
                KeyCode::Left => {
                    self.navigator.back();
                }
                KeyCode::Right => {
                    self.navigator.forward();
                }
                _ => {}
            }
            return Ok(true);
        }

        let path = self.navigator.current().path().to_string();
        let on_models = HomeTab::of(&path) == Some(HomeTab::Tags);
        let on_home = HomeTab::of(&path).is_some();
        match key.code {
            KeyCode::Char('q') => return Ok(false),
            KeyCode::Tab => {
                let next = Section::of(&path).map_or(Section::Home, Section::next);
                self.navigate(next.path());
            }
            KeyCode::BackTab => {
                let previous = Section::of(&path).map_or(Section::Home, Section::previous);
                self.navigate(previous.path());
            }
            KeyCode::Right => {
                if let Some(tab) = HomeTab::of(&path) {
                    self.navigate(tab.next().path());
                }
            }
            KeyCode::Left => {
                if let Some(tab) = HomeTab::of(&path) {
                    self.navigate(tab.previous().path());
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(target) = nav::shortcut(c) {
                    self.navigate(target);
                }
            }
            KeyCode::Char(':') => self.open_prompt(PromptKind::Path),
            KeyCode::Char('p') if on_home => self.open_prompt(PromptKind::Pull),
            KeyCode::Up if on_models => self.select_model(-1),
            KeyCode::Down if on_models => self.select_model(1),
            KeyCode::PageUp if on_models => self.select_model(-PAGE_ROWS),
            KeyCode::PageDown if on_models => self.select_model(PAGE_ROWS),
            KeyCode::Enter | KeyCode::Char('i') if on_models => self.show_selected(),
            KeyCode::Char('d') if on_models => self.delete_selected(pending_delete),
            KeyCode::Esc => {
                *self.detail.write() = None;
            }
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-PAGE_ROWS),
            KeyCode::PageDown => self.scroll_by(PAGE_ROWS),
            KeyCode::Char('s') => self.start_ollama(),
            KeyCode::Char('r') => {
                self.heartbeat.request_tick();
                self.set_notice("Checking Ollama status...", false);
            }
            _ => {}
        }

        Ok(true)
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
    }

    fn handle_prompt(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(c) => prompt.input.push(c),
            KeyCode::Enter => {
                let kind = prompt.kind;
                let target = prompt.input.trim().to_string();
                self.prompt = None;
                if target.is_empty() {
                    return;
                }
                match kind {
                    PromptKind::Path => self.navigate(&target),
                    PromptKind::Pull => self.start_pull(target),
                }
            }
            _ => {}
        }
    }

    fn scroll_by(&mut self, rows: i32) {
        let limit = self.scroll_limit.load(Ordering::Relaxed);
        self.navigator.scroll_by(rows, limit);
    }

    fn model_names(&self) -> Vec<String> {
        self.models
            .read()
            .data
            .as_ref()
            .map(|data| data.models.iter().map(|m| m.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Name of the highlighted model, keeping the selection inside the list.
    pub fn selected_model_name(&self) -> Option<String> {
        let names = self.model_names();
        let last = names.len().checked_sub(1)?;
        names.into_iter().nth(self.selected_model.min(last))
    }

    fn select_model(&mut self, delta: i32) {
        let count = self.model_names().len();
        if count == 0 {
            self.selected_model = 0;
            return;
        }
        let current = self.selected_model.min(count - 1) as i64;
        self.selected_model = (current + delta as i64).clamp(0, count as i64 - 1) as usize;
    }

    fn show_selected(&mut self) {
        let Some(name) = self.selected_model_name() else {
            return;
        };
        let client = self.heartbeat.client().clone();
        let detail = Arc::clone(&self.detail);
        *detail.write() = Some(ModelDetail {
            name: name.clone(),
            state: MonitorState::new(),
        });
        tokio::spawn(async move {
            load_detail(&client, &name, &detail).await;
        });
    }

    fn delete_selected(&mut self, pending: Option<String>) {
        let Some(name) = self.selected_model_name() else {
            return;
        };
        if pending.as_deref() != Some(name.as_str()) {
            self.set_notice(format!("Press d again to delete {}", name), true);
            self.pending_delete = Some(name);
            return;
        }

        self.set_notice(format!("Deleting {}...", name), false);
        let client = self.heartbeat.client().clone();
        let store = self.store.clone();
        let models = Arc::clone(&self.models);
        let notice = Arc::clone(&self.notice);
        tokio::spawn(async move {
            let next = match client.delete(&name).await {
                Ok(()) => {
                    log::info!("Deleted model {}", name);
                    Notice {
                        text: format!("Deleted {}", name),
                        error: false,
                    }
                }
                Err(e) => {
                    log::error!("Failed to delete {}: {}", name, e);
                    Notice {
                        text: format!("Cannot delete {}: {}", name, e),
                        error: true,
                    }
                }
            };
            *notice.write() = Some(next);
            refresh_models(&client, &store, &models).await;
        });
    }

    fn start_pull(&mut self, model: String) {
        if !begin_pull(&self.pull, &model) {
            self.set_notice("A pull is already running", true);
            return;
        }
        self.set_notice(format!("Pulling {}...", model), false);

        let client = self.heartbeat.client().clone();
        let store = self.store.clone();
        let pull = Arc::clone(&self.pull);
        let models = Arc::clone(&self.models);
        let notice = Arc::clone(&self.notice);
        tokio::spawn(async move {
            let next = if pull_model(&client, &model, &pull).await {
                Notice {
                    text: format!("Pulled {}", model),
                    error: false,
                }
            } else {
                Notice {
                    text: format!("Pull of {} failed", model),
                    error: true,
                }
            };
            *notice.write() = Some(next);
            refresh_models(&client, &store, &models).await;
        });
    }

    /// Resolves `path`, records it in history and loads the views it mounts.
    pub fn navigate(&mut self, path: &str) {
        match self.navigator.push(path) {
            Ok(resolved) => {
                let chain = resolved.matched.clone();
                self.views.load_chain(&chain);
                log::debug!("{} views loaded", self.views.loaded_count());
            }
            Err(e) => {
                log::error!("Navigation to {:?} failed: {}", path, e);
                self.set_notice(format!("Cannot open {}: {}", path, e), true);
            }
        }
    }

    fn start_ollama(&mut self) {
        if !self.store.can_start() {
            self.set_notice("Ollama cannot be started from here", true);
            return;
        }

        if self.starting.swap(true, Ordering::SeqCst) {
            self.set_notice("Ollama is already starting", false);
            return;
        }

        let timeout = Duration::from_secs(self.config.read().ollama.start_timeout_seconds.max(1));
        let heartbeat = Arc::clone(&self.heartbeat);
        let notice = Arc::clone(&self.notice);
        let starting = Arc::clone(&self.starting);
        self.set_notice("Starting Ollama...", false);

        tokio::spawn(async move {
            let result = heartbeat.start(timeout).await;
            starting.store(false, Ordering::SeqCst);
            let next = match result {
                Ok(()) => Notice {
                    text: "Ollama started".to_string(),
                    error: false,
                },
                Err(e) => {
                    log::error!("Failed to start Ollama: {:#}", e);
                    Notice {
                        text: format!("{:#}", e),
                        error: true,
                    }
                }
            };
            *notice.write() = Some(next);
        });
    }

    fn set_notice(&self, text: impl Into<String>, error: bool) {
        *self.notice.write() = Some(Notice {
            text: text.into(),
            error,
        });
    }
}
