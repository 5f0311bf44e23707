use std::{collections::HashMap, path::Path, time::Duration};

use anyhow::{bail, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3131/functions/v1/analyze-case";
pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_PROFILE: &str = "legal";
pub const DEFAULT_TIMEOUT_S: u64 = 120;

/// Runtime configuration shared by the client and the relay.
/// Credentials come from env/.env only and are never logged.
#[derive(Clone)]
pub struct Config {
    /// Relay URL the client posts `{caseText}` to.
    pub analyze_endpoint: String,
    pub analyze_publishable_key: String,

    // Upstream chat-completions gateway
    pub gateway_url: String,
    pub gateway_api_key: String,
    pub model: String,

    pub analysis_profile: String,
    pub analysis_timeout_s: u64,

    pub web_bind: String,
    pub web_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("analyze_endpoint", &self.analyze_endpoint)
            .field("gateway_url", &self.gateway_url)
            .field("gateway_api_key", &redact(&self.gateway_api_key))
            .field("model", &self.model)
            .field("analysis_profile", &self.analysis_profile)
            .field("analysis_timeout_s", &self.analysis_timeout_s)
            .field("web_bind", &self.web_bind)
            .field("web_port", &self.web_port)
            .finish_non_exhaustive()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::load(&HashMap::new(), |_| None)
    }
}

fn parse_dotenv_str(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim();
            let v = v
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(v);
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn parse_dotenv(path: &Path) -> HashMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_dotenv_str(&contents),
        Err(_) => HashMap::new(),
    }
}

fn get(key: &str, dotenv: &HashMap<String, String>, env: &impl Fn(&str) -> Option<String>) -> Option<String> {
    env(key).or_else(|| dotenv.get(key).cloned())
}

fn get_str(
    key: &str,
    dotenv: &HashMap<String, String>,
    env: &impl Fn(&str) -> Option<String>,
    default: &str,
) -> String {
    get(key, dotenv, env)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_u64(
    key: &str,
    dotenv: &HashMap<String, String>,
    env: &impl Fn(&str) -> Option<String>,
    default: u64,
) -> u64 {
    get(key, dotenv, env)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u16(
    key: &str,
    dotenv: &HashMap<String, String>,
    env: &impl Fn(&str) -> Option<String>,
    default: u16,
) -> u16 {
    get(key, dotenv, env)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Process env first, then `.env` in the working directory.
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv(Path::new(".env"));
        let config = Self::load(&dotenv, |k| std::env::var(k).ok());
        config.validate()?;
        Ok(config)
    }

    fn load(dotenv: &HashMap<String, String>, env: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            analyze_endpoint: get_str("ANALYZE_ENDPOINT", dotenv, &env, DEFAULT_ENDPOINT),
            analyze_publishable_key: get_str("ANALYZE_PUBLISHABLE_KEY", dotenv, &env, ""),
            gateway_url: get_str("GATEWAY_URL", dotenv, &env, DEFAULT_GATEWAY_URL),
            gateway_api_key: get_str("GATEWAY_API_KEY", dotenv, &env, ""),
            model: get_str("MODEL", dotenv, &env, DEFAULT_MODEL),
            analysis_profile: get_str("ANALYSIS_PROFILE", dotenv, &env, DEFAULT_PROFILE),
            analysis_timeout_s: get_u64("ANALYSIS_TIMEOUT_S", dotenv, &env, DEFAULT_TIMEOUT_S),
            web_bind: get_str("WEB_BIND", dotenv, &env, "127.0.0.1"),
            web_port: get_u16("WEB_PORT", dotenv, &env, 3131),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.analysis_timeout_s == 0 {
            bail!("ANALYSIS_TIMEOUT_S must be at least 1");
        }
        if !self.analyze_endpoint.starts_with("http") {
            bail!("ANALYZE_ENDPOINT must be an http(s) URL: {}", self.analyze_endpoint);
        }
        if !self.gateway_url.starts_with("http") {
            bail!("GATEWAY_URL must be an http(s) URL: {}", self.gateway_url);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_s)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web_bind, self.web_port)
    }

    pub fn gateway_configured(&self) -> bool {
        !self.gateway_api_key.is_empty()
    }
}
