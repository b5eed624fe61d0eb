use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub api_base: String,
    /// No timeout when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
        let dir = exe.parent().unwrap_or(Path::new("."));
        dir.join("config.json")
    }

    /// `config.json` next to the executable, then environment overrides.
    pub fn load() -> Self {
        let mut cfg = Self::load_from(&Self::path());
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg
    }

    pub fn load_from(path: &Path) -> Self {
        match read_if_present(path) {
            Ok(Some(s)) => serde_json::from_str::<Config>(&s).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("cannot read {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Non-empty values win over whatever the file said.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
        if let Some(v) = non_empty("OPENAI_API_KEY") { self.openai_api_key = v; }
        if let Some(v) = non_empty("OPENAI_MODEL") { self.openai_model = v; }
        if let Some(v) = non_empty("OPENAI_API_BASE") { self.api_base = v; }
    }
}

/// A missing file is `Ok(None)`; any other read failure is an error.
fn read_if_present(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
