use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::integrations::host::{clean_env_value, DEFAULT_HOST, DEFAULT_PORT};
use crate::integrations::{OllamaHost, ReleaseSource};

// Bundled default configuration, written into the work directory when no
// config file exists there yet.
const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

const DEFAULT_WORK_DIR: &str = "~/.ollama-desktop";
const CONFIG_FILE: &str = "config/ollama-desk.toml";
const LOG_FILE: &str = "log/ollama-desk.log";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub ollama: OllamaConfig,
    pub release: ReleaseConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub app_name: String,
    pub tick_rate_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    pub scheme: String,
    pub host: String,
    pub port: String,
    pub executable: String,
    pub heartbeat_interval_ms: u64,
    pub models_refresh_interval_ms: u64,
    pub request_timeout_seconds: u64,
    pub start_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseConfig {
    pub channel: ReleaseSource,
    pub owner: String,
    pub repo: String,
    pub check_app_upgrade: bool,
    pub app_owner: String,
    pub app_repo: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub dark: DarkTheme,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DarkTheme {
    pub background: String,
    pub foreground: String,
    pub accent_color: String,
    pub ollama_color: String,
    pub warning_color: String,
    pub error_color: String,
    pub success_color: String,
    pub muted_color: String,
}

impl OllamaConfig {
    /// Configured host, falling back to `OLLAMA_HOST` when `host` is empty.
    pub fn resolve_host(&self) -> OllamaHost {
        if self.host.trim().is_empty() {
            return OllamaHost::from_env();
        }
        OllamaHost {
            scheme: nvl(&self.scheme, "http"),
            host: nvl(&self.host, DEFAULT_HOST),
            port: nvl(&self.port, DEFAULT_PORT),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

fn nvl(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

impl Config {
    pub fn bundled() -> Result<Self> {
        toml::from_str(DEFAULT_CONFIG).context("Failed to parse bundled default config")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Loads `path`, or falls back to the bundled config and tries to write
    /// it to `path` so it can be edited.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path.as_ref()) {
            Ok(config) => Ok(config),
            Err(load_err) => {
                log::warn!(
                    "Falling back to bundled default config: {:#}. A new config will be written to {:?} if possible.",
                    load_err,
                    path.as_ref()
                );

                let default_config = Self::bundled()?;
                if path.as_ref().exists() {
                    // Keep a broken file for the user to fix rather than
                    // overwriting it.
                    return Ok(default_config);
                }

                if let Err(save_err) = default_config.save(path.as_ref()) {
                    log::warn!("Failed to write default config: {}", save_err);
                }

                Ok(default_config)
            }
        }
    }
}

/// Application work directory: `OLLAMA_DESKTOP_WORKDIR` or
/// `~/.ollama-desktop`. Created when missing.
pub fn work_dir() -> Result<PathBuf> {
    let configured = std::env::var("OLLAMA_DESKTOP_WORKDIR").unwrap_or_default();
    let configured = clean_env_value(&configured);
    let raw = if configured.is_empty() {
        DEFAULT_WORK_DIR
    } else {
        configured
    };

    let dir = expand_home(raw)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create work directory: {:?}", dir))?;
    Ok(dir)
}

pub fn config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(CONFIG_FILE)
}

pub fn log_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOG_FILE)
}

fn expand_home(raw: &str) -> Result<PathBuf> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(PathBuf::from(raw));
    };
    let home = dirs::home_dir().context("Cannot determine home directory")?;
    Ok(home.join(rest.trim_start_matches(|c| c == '/' || c == '\\')))
}

/// Keeps a shared config in sync with its file on disk.
pub struct ConfigManager {
    config: Arc<RwLock<Config>>,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config: Arc<RwLock<Config>>, config_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            config,
            config_path,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn watch(self: Arc<Self>) -> Result<()> {
        use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc::channel;

        let (tx, rx) = channel::<Result<Event, notify::Error>>();

        let mut watcher = RecommendedWatcher::new(tx, notify::Config::default())
            .context("Failed to create file watcher")?;

        watcher
            .watch(self.config_path.as_ref(), RecursiveMode::NonRecursive)
            .context("Failed to watch config file")?;

        std::thread::spawn(move || {
            // Keep watcher alive
            let _watcher = watcher;

            loop {
                match rx.recv() {
                    Ok(Ok(event)) => {
                        use notify::EventKind;
                        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            // Small delay to ensure file is fully written
                            std::thread::sleep(Duration::from_millis(100));
                            self.reload();
                        }
                    }
                    Ok(Err(e)) => {
                        log::error!("Watch error: {:?}", e);
                    }
                    Err(e) => {
                        log::error!("Channel error: {:?}", e);
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    pub fn reload(&self) -> bool {
        match Config::load(&self.config_path) {
            Ok(new_config) => {
                crate::logging::apply_level(&new_config.logging.level);
                *self.config.write() = new_config;
                log::info!("Configuration reloaded successfully");
                true
            }
            Err(e) => {
                log::error!("Failed to reload config: {:#}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_parses() {
        let config = Config::bundled().expect("bundled config");
        assert_eq!(config.release.channel, ReleaseSource::Github);
        assert_eq!(config.ollama.executable, "ollama");
        assert!(config.proxy.url.is_empty());
        assert!(config.ollama.heartbeat_interval_ms > 0);
    }

    #[test]
    fn load_or_default_writes_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = config_path(dir.path());

        let config = Config::load_or_default(&path).expect("config");
        assert_eq!(config.general.app_name, "Ollama Desk");
        assert!(path.exists());

        let reloaded = Config::load(&path).expect("written config loads");
        assert_eq!(reloaded.ollama.port, config.ollama.port);
    }

    #[test]
    fn broken_file_is_left_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "general = [").expect("write");

        let config = Config::load_or_default(&path).expect("falls back");
        assert_eq!(config.release.repo, "ollama");
        assert_eq!(fs::read_to_string(&path).expect("read"), "general = [");
    }

    #[test]
    fn reload_replaces_shared_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut config = Config::bundled().expect("bundled");
        let shared = Arc::new(RwLock::new(config.clone()));

        config.general.app_name = "Renamed".to_string();
        config.save(&path).expect("save");

        let manager = ConfigManager::new(Arc::clone(&shared), path);
        assert!(manager.reload());
        assert_eq!(shared.read().general.app_name, "Renamed");
    }

    #[test]
    fn explicit_host_uses_defaults_for_blanks() {
        let mut ollama = Config::bundled().expect("bundled").ollama;
        ollama.host = "10.1.1.5".to_string();
        ollama.scheme = String::new();
        ollama.port = " ".to_string();

        let host = ollama.resolve_host();
        assert_eq!(host.base_url(), "http://10.1.1.5:11434");
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/.ollama-desktop").expect("expand"),
                home.join(".ollama-desktop")
            );
        }
        assert_eq!(
            expand_home("/tmp/desk").expect("absolute"),
            PathBuf::from("/tmp/desk")
        );
    }
}
