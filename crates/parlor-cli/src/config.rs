//! Configuration Vault – reads/writes `~/.parlor/config.toml`.

use chrono::TimeDelta;
use parlor_memory::ShortTermConfig;
use parlor_runtime::{RemoteSettings, ReplyBackend};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

/// Retention settings for short-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySettings {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_min_retained")]
    pub min_retained: usize,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            min_retained: default_min_retained(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl MemorySettings {
    /// Negative TTLs become zero; TTLs beyond `TimeDelta`'s range saturate.
    pub fn short_term(&self) -> ShortTermConfig {
        ShortTermConfig {
            capacity: self.capacity,
            min_retained: self.min_retained,
            time_to_live: TimeDelta::try_seconds(self.ttl_secs.max(0)).unwrap_or(TimeDelta::MAX),
        }
    }
}

/// Persisted user configuration stored in `~/.parlor/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reply generator: `mock` (offline) or `remote`.
    #[serde(default)]
    pub reply_backend: ReplyBackend,

    /// Base URL of the OpenAI-compatible model server.
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    /// Model name passed to the server (e.g. "llama3", "gpt-4o").
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for hosted APIs.  Wiped from memory on drop.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Optional persona JSON file; the built-in persona is used otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_path: Option<PathBuf>,

    /// Folder scanned by the document Q&A mode.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    #[serde(default)]
    pub memory: MemorySettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("reply_backend", &self.reply_backend)
            .field("llm_base_url", &self.llm_base_url)
            .field("model", &self.model)
            .field(
                "api_key",
                if self.api_key.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .field("persona_path", &self.persona_path)
            .field("docs_dir", &self.docs_dir)
            .field("memory", &self.memory)
            .finish()
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3".to_string()
}
fn default_docs_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_capacity() -> usize {
    20
}
fn default_min_retained() -> usize {
    3
}
fn default_ttl_secs() -> i64 {
    36 * 3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reply_backend: ReplyBackend::default(),
            llm_base_url: default_llm_base_url(),
            model: default_model(),
            api_key: String::new(),
            persona_path: None,
            docs_dir: default_docs_dir(),
            memory: MemorySettings::default(),
        }
    }
}

impl Config {
    pub fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            base_url: self.llm_base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

/// Return the path to `~/.parlor/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".parlor").join("config.toml")
}

/// Load the config from disk and apply `PARLOR_*` overrides.  Returns `None`
/// if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Load `.env` from the working directory or one of its parents into the
/// process environment.  Variables that are already set win.  Returns the
/// file that was read, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

pub(crate) fn load_env_file(path: &Path) -> Result<(), String> {
    dotenvy::from_path(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

/// Apply `PARLOR_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PARLOR_BACKEND` | `reply_backend` (`mock` / `remote`) |
/// | `PARLOR_LLM_URL` | `llm_base_url` |
/// | `PARLOR_MODEL` | `model` |
/// | `PARLOR_API_KEY` | `api_key` |
/// | `PARLOR_DOCS_DIR` | `docs_dir` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PARLOR_BACKEND") {
        match v.to_lowercase().as_str() {
            "mock" => cfg.reply_backend = ReplyBackend::Mock,
            "remote" => cfg.reply_backend = ReplyBackend::Remote,
            _ => {}
        }
    }
    if let Ok(v) = std::env::var("PARLOR_LLM_URL") {
        cfg.llm_base_url = v;
    }
    if let Ok(v) = std::env::var("PARLOR_MODEL") {
        cfg.model = v;
    }
    if let Ok(v) = std::env::var("PARLOR_API_KEY") {
        cfg.api_key = v;
    }
    if let Ok(v) = std::env::var("PARLOR_DOCS_DIR") {
        cfg.docs_dir = PathBuf::from(v);
    }
}

/// Save the config to disk, creating `~/.parlor/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_debug_redacts_api_key() {
        let mut cfg = Config::default();
        cfg.api_key = "sk-super-secret".to_string();
        let debug_str = format!("{:?}", cfg);
        assert!(!debug_str.contains("sk-super-secret"));
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    fn config_debug_shows_not_set_for_empty_key() {
        let debug_str = format!("{:?}", Config::default());
        assert!(debug_str.contains("<not set>"));
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .expect("meta")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.reply_backend, ReplyBackend::Mock);
        assert_eq!(loaded.model, "llama3");
        assert_eq!(loaded.memory, MemorySettings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reply_backend = \"remote\"\n[memory]\ncapacity = 5\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.reply_backend, ReplyBackend::Remote);
        assert_eq!(loaded.memory.capacity, 5);
        assert_eq!(loaded.memory.min_retained, 3);
        assert_eq!(loaded.llm_base_url, "http://localhost:11434");
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reply_backend = [").unwrap();
        assert!(load_from(&path).unwrap_err().contains("Failed to parse config"));
    }

    #[test]
    fn config_path_points_to_parlor_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".parlor"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn memory_settings_map_to_short_term_config() {
        let settings = MemorySettings {
            capacity: 7,
            min_retained: 2,
            ttl_secs: 60,
        };
        let st = settings.short_term();
        assert_eq!(st.capacity, 7);
        assert_eq!(st.min_retained, 2);
        assert_eq!(st.time_to_live, TimeDelta::seconds(60));
    }

    #[test]
    fn out_of_range_ttl_saturates() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[memory]\nttl_secs = 9223372036854775807\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.memory.short_term().time_to_live, TimeDelta::MAX);
    }

    #[test]
    fn negative_ttl_clamps_to_zero() {
        let settings = MemorySettings {
            ttl_secs: -5,
            ..MemorySettings::default()
        };
        assert_eq!(settings.short_term().time_to_live, TimeDelta::zero());
    }

    // Each test below owns a distinct variable, so they do not race.

    #[test]
    fn apply_env_overrides_changes_backend() {
        // SAFETY: PARLOR_BACKEND is only touched by this test.
        unsafe { std::env::set_var("PARLOR_BACKEND", "Remote") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.reply_backend, ReplyBackend::Remote);
        unsafe { std::env::remove_var("PARLOR_BACKEND") };
    }

    #[test]
    fn apply_env_overrides_changes_model() {
        // SAFETY: PARLOR_MODEL is only touched by this test.
        unsafe { std::env::set_var("PARLOR_MODEL", "gpt-4o") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.model, "gpt-4o");
        unsafe { std::env::remove_var("PARLOR_MODEL") };
    }

    #[test]
    fn apply_env_overrides_changes_llm_url() {
        // SAFETY: PARLOR_LLM_URL is only touched by this test.
        unsafe { std::env::set_var("PARLOR_LLM_URL", "http://gpu-box:11434") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.llm_base_url, "http://gpu-box:11434");
        unsafe { std::env::remove_var("PARLOR_LLM_URL") };
    }

    #[test]
    fn env_file_supplies_api_key() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "# local secrets\nPARLOR_API_KEY=sk-from-env-file\n").unwrap();

        // SAFETY: PARLOR_API_KEY is only touched by this test.
        unsafe { std::env::remove_var("PARLOR_API_KEY") };
        load_env_file(&path).expect("env file loads");
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.api_key, "sk-from-env-file");
        unsafe { std::env::remove_var("PARLOR_API_KEY") };
    }

    #[test]
    fn missing_env_file_is_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        assert!(load_env_file(&dir.path().join(".env")).is_err());
    }
}
