use super::host::clean_env_value;

/// An environment variable the Ollama server reads, with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaEnvVar {
    pub name: &'static str,
    pub value: String,
    pub description: &'static str,
}

const COMMON: &[(&str, &str)] = &[
    ("OLLAMA_DEBUG", "Show additional debug information (e.g. OLLAMA_DEBUG=1)"),
    ("OLLAMA_FLASH_ATTENTION", "Enabled flash attention"),
    ("OLLAMA_KV_CACHE_TYPE", "Quantization type for the K/V cache (default: f16)"),
    ("OLLAMA_GPU_OVERHEAD", "Reserve a portion of VRAM per GPU (bytes)"),
    ("OLLAMA_HOST", "IP Address for the ollama server (default 127.0.0.1:11434)"),
    ("OLLAMA_KEEP_ALIVE", "The duration that models stay loaded in memory (default \"5m\")"),
    ("OLLAMA_LLM_LIBRARY", "Set LLM library to bypass autodetection"),
    ("OLLAMA_LOAD_TIMEOUT", "How long to allow model loads to stall before giving up (default \"5m\")"),
    ("OLLAMA_MAX_LOADED_MODELS", "Maximum number of loaded models per GPU"),
    ("OLLAMA_MAX_QUEUE", "Maximum number of queued requests"),
    ("OLLAMA_MODELS", "The path to the models directory"),
    ("OLLAMA_NOHISTORY", "Do not preserve readline history"),
    ("OLLAMA_NOPRUNE", "Do not prune model blobs on startup"),
    ("OLLAMA_NUM_PARALLEL", "Maximum number of parallel requests"),
    ("OLLAMA_ORIGINS", "A comma separated list of allowed origins"),
    ("OLLAMA_SCHED_SPREAD", "Always schedule model across all GPUs"),
    ("OLLAMA_MULTIUSER_CACHE", "Optimize prompt caching for multi-user scenarios"),
    ("HTTP_PROXY", "HTTP proxy"),
    ("HTTPS_PROXY", "HTTPS proxy"),
    ("NO_PROXY", "No proxy"),
];

// Windows variables are case-insensitive, the lowercase forms would repeat.
const LOWERCASE_PROXY: &[(&str, &str)] = &[
    ("http_proxy", "HTTP proxy"),
    ("https_proxy", "HTTPS proxy"),
    ("no_proxy", "No proxy"),
];

const GPU_SELECTION: &[(&str, &str)] = &[
    ("CUDA_VISIBLE_DEVICES", "Set which NVIDIA devices are visible"),
    ("HIP_VISIBLE_DEVICES", "Set which AMD devices are visible"),
    ("ROCR_VISIBLE_DEVICES", "Set which AMD devices are visible"),
    ("GPU_DEVICE_ORDINAL", "Set which AMD devices are visible"),
    ("HSA_OVERRIDE_GFX_VERSION", "Override the gfx used for all detected AMD GPUs"),
    ("OLLAMA_INTEL_GPU", "Enable experimental Intel GPU detection"),
];

/// Variables relevant on `os` (as in `std::env::consts::OS`), read through
/// `lookup`.
pub fn ollama_env_vars_with<F>(os: &str, lookup: F) -> Vec<OllamaEnvVar>
where
    F: Fn(&str) -> Option<String>,
{
    let mut groups = vec![COMMON];
    if os != "windows" {
        groups.push(LOWERCASE_PROXY);
    }
    if os != "macos" {
        groups.push(GPU_SELECTION);
    }

    groups
        .into_iter()
        .flatten()
        .map(|&(name, description)| OllamaEnvVar {
            name,
            value: lookup(name)
                .map(|raw| clean_env_value(&raw).to_string())
                .unwrap_or_default(),
            description,
        })
        .collect()
}

pub fn ollama_env_vars() -> Vec<OllamaEnvVar> {
    ollama_env_vars_with(std::env::consts::OS, |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_specific_groups() {
        let none = |_: &str| None;
        let linux = ollama_env_vars_with("linux", none);
        let windows = ollama_env_vars_with("windows", none);
        let macos = ollama_env_vars_with("macos", none);

        assert_eq!(linux.len(), COMMON.len() + LOWERCASE_PROXY.len() + GPU_SELECTION.len());
        assert_eq!(windows.len(), COMMON.len() + GPU_SELECTION.len());
        assert_eq!(macos.len(), COMMON.len() + LOWERCASE_PROXY.len());
        assert!(!windows.iter().any(|v| v.name == "http_proxy"));
        assert!(!macos.iter().any(|v| v.name == "CUDA_VISIBLE_DEVICES"));
    }

    #[test]
    fn values_are_cleaned() {
        let vars = ollama_env_vars_with("linux", |name| {
            (name == "OLLAMA_MODELS").then(|| "  \"/data/models\" ".to_string())
        });
        let models = vars.iter().find(|v| v.name == "OLLAMA_MODELS").expect("listed");
        assert_eq!(models.value, "/data/models");
        assert!(vars
            .iter()
            .filter(|v| v.name != "OLLAMA_MODELS")
            .all(|v| v.value.is_empty()));
    }
}
