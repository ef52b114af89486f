use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::ollama::OllamaError;

/// Whether this platform ships a desktop Ollama app that can be launched.
pub fn can_launch_app() -> bool {
    cfg!(any(target_os = "windows", target_os = "macos"))
}

/// Locates and launches the local `ollama` installation.
#[derive(Debug, Clone)]
pub struct OllamaInstall {
    executable: String,
    probe_timeout: Duration,
}

impl OllamaInstall {
    pub fn new(executable: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            probe_timeout,
        }
    }

    /// `ollama --version` runs and exits successfully.
    pub async fn check_installed(&self) -> bool {
        let executable = self.executable.clone();
        let probe = tokio::task::spawn_blocking(move || {
            Command::new(&executable)
                .arg("--version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
        });

        match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(Ok(Ok(status))) => status.success(),
            Ok(Ok(Err(e))) => {
                log::debug!("{} --version failed: {}", self.executable, e);
                false
            }
            Ok(Err(e)) => {
                log::warn!("install probe task failed: {}", e);
                false
            }
            Err(_) => {
                log::warn!("{} --version timed out", self.executable);
                false
            }
        }
    }

    /// Starts the desktop app, which in turn starts the server. Returns once
    /// the process is spawned, not once the server answers.
    pub fn launch_app(&self) -> Result<(), OllamaError> {
        let mut command = app_command()?;
        let program = format!("{:?}", command.get_program());
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|source| OllamaError::Spawn { program, source })
    }
}

#[cfg(target_os = "macos")]
fn app_command() -> Result<Command, OllamaError> {
    let mut command = Command::new("open");
    command.args(["-a", "Ollama"]);
    Ok(command)
}

#[cfg(target_os = "windows")]
fn app_command() -> Result<Command, OllamaError> {
    let base = std::env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .or_else(dirs::data_local_dir)
        .unwrap_or_default();
    Ok(Command::new(windows_app_path(&base)))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn app_command() -> Result<Command, OllamaError> {
    Err(OllamaError::Unsupported(std::env::consts::OS))
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn windows_app_path(local_app_data: &std::path::Path) -> PathBuf {
    local_app_data
        .join("Programs")
        .join("Ollama")
        .join("ollama app.exe")
}
