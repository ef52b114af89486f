use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use semver::Version;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::Config;
use crate::integrations::install::can_launch_app;
use crate::integrations::{OllamaClient, OllamaInstall, ReleaseChecker, ReleaseItem};
use crate::store::{OllamaStatus, StatusStore};
use crate::utils::version::{is_newer_version, parse_version};

/// Minimum wait between failed release lookups; the GitHub API allows
/// 60 anonymous requests an hour.
const RELEASE_RETRY: Duration = Duration::from_secs(5 * 60);

#[derive(Default)]
struct HeartbeatState {
    started: bool,
    version: Option<Version>,
    last_release: Option<ReleaseItem>,
    release_failed_at: Option<Instant>,
    upgrade: Option<bool>,
}

/// Probes the local Ollama service and publishes what it finds into the
/// status store.
pub struct Heartbeat {
    client: OllamaClient,
    install: OllamaInstall,
    releases: ReleaseChecker,
    owner: String,
    repo: String,
    store: StatusStore,
    launchable: bool,
    state: Mutex<HeartbeatState>,
    wake: Notify,
}

impl Heartbeat {
    pub fn new(
        client: OllamaClient,
        install: OllamaInstall,
        releases: ReleaseChecker,
        owner: impl Into<String>,
        repo: impl Into<String>,
        store: StatusStore,
    ) -> Self {
        Self {
            client,
            install,
            releases,
            owner: owner.into(),
            repo: repo.into(),
            store,
            launchable: can_launch_app(),
            state: Mutex::new(HeartbeatState::default()),
            wake: Notify::new(),
        }
    }

    #[cfg(test)]
    pub fn with_launchable(mut self, launchable: bool) -> Self {
        self.launchable = launchable;
        self
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Runs one probe and applies the result to the store.
    pub async fn tick(&self) -> OllamaStatus {
        let mut state = self.state.lock().await;

        let started = self.client.heartbeat().await.is_ok();
        if started != state.started {
            log::info!("ollama {}", if started { "started" } else { "stopped" });
            state.started = started;
            state.version = None;
            state.upgrade = None;
        }

        let installed = started || self.install.check_installed().await;

        if started && state.version.is_none() {
            match self.client.version().await {
                Ok(raw) => match parse_version(&raw) {
                    Some(version) => {
                        log::info!("ollama version {}", version);
                        state.version = Some(version);
                    }
                    None => log::warn!("unrecognized ollama version {:?}", raw),
                },
                Err(e) => log::warn!("get ollama version: {}", e),
            }
        }

        if state.last_release.is_none() && self.release_due(&state) {
            match self.releases.latest(&self.owner, &self.repo).await {
                Ok(item) => {
                    if let Some(item) = &item {
                        log::info!(
                            "check ollama upgrade: channel={} name={}",
                            self.releases.channel(),
                            item.name
                        );
                    }
                    state.last_release = item;
                    state.release_failed_at = None;
                }
                Err(e) => {
                    log::warn!("check ollama upgrade: {}", e);
                    state.release_failed_at = Some(Instant::now());
                }
            }
        }

        if state.upgrade.is_none() {
            if let (Some(last), Some(current)) = (&state.last_release, &state.version) {
                state.upgrade = Some(is_upgrade(last, current));
            }
        }

        let status = OllamaStatus {
            installed,
            started,
            can_start: !started && installed && self.launchable,
            version: state
                .version
                .as_ref()
                .map(Version::to_string)
                .unwrap_or_default(),
            upgrade: state.upgrade.unwrap_or(false),
            last_version: state.last_release.clone(),
        };
        drop(state);

        self.store.apply(status.clone());
        status
    }

    fn release_due(&self, state: &HeartbeatState) -> bool {
        state
            .release_failed_at
            .map_or(true, |at| at.elapsed() >= RELEASE_RETRY)
    }

    /// Asks the background loop for an immediate probe.
    pub fn request_tick(&self) {
        self.wake.notify_one();
    }

    /// Launches the Ollama app and waits for the server to answer.
    pub async fn start(&self, timeout: Duration) -> Result<()> {
        self.install
            .launch_app()
            .context("Failed to start Ollama app")?;

        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.client.heartbeat().await.is_ok() {
                break;
            }
            sleep(Duration::from_millis(500)).await;
        }

        let status = self.tick().await;
        if !status.started {
            bail!("Ollama did not answer within {}s", timeout.as_secs());
        }
        Ok(())
    }

    /// Probes forever, every `ollama.heartbeat_interval_ms` or when woken.
    pub fn spawn(self: &Arc<Self>, config: Arc<RwLock<Config>>) -> JoinHandle<()> {
        let heartbeat = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                heartbeat.tick().await;

                let interval = config.read().ollama.heartbeat_interval_ms.max(1000);
                tokio::select! {
                    _ = sleep(Duration::from_millis(interval)) => {}
                    _ = heartbeat.wake.notified() => {}
                }
            }
        })
    }
}

/// Latest release is newer than the running server. A release name that
/// does not parse is logged and treated as no upgrade.
fn is_upgrade(last: &ReleaseItem, current: &Version) -> bool {
    match parse_version(&last.name).or_else(|| parse_version(&last.tag_name)) {
        Some(latest) => is_newer_version(&latest, current),
        None => {
            log::warn!("check ollama upgrade: unparsable release {:?}", last.name);
            false
        }
    }
}
