//! CLI configuration, loaded from TOML with environment overrides.
//!
//! ```toml
//! [auth]
//! openai_api_key = "sk-..."
//! cloudflare_api_token = "..."
//!
//! [defaults]
//! account_id = "..."
//! zone_name = "example.com"
//! model_id = "gpt-4o-mini"
//! api_base = "https://api.openai.com"
//! ```

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_interpreter::OpenAiConfig;
use ts_interpreter::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
pub const ENV_CLOUDFLARE_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const ENV_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const ENV_CONFIG_PATH: &str = "TS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OpenAI API key is required but not configured (run `ts init` or set OPENAI_API_KEY)")]
    MissingOpenAiKey,

    #[error("config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot locate the config directory: HOME is not set")]
    NoHome,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_api_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthConfig")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("cloudflare_api_token", &redact(&self.cloudflare_api_token))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Default zone; `zone_name` in the file.
    #[serde(default, rename = "zone_name", skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_model_id() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            zone: None,
            model_id: default_model_id(),
            api_base: default_api_base(),
        }
    }
}

/// Top-level configuration. Read once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Config {
    /// `$TS_CONFIG`, else `~/.config/terrasmart/config.toml`.
    pub fn default_path() -> ConfigResult<PathBuf> {
        if let Some(path) = std::env::var_os(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("terrasmart")
            .join("config.toml"))
    }

    /// Load a TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` (or the default location) and apply the process
    /// environment on top.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Override credentials and account id from non-empty variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(key) = get(ENV_OPENAI_KEY) {
            self.auth.openai_api_key = Some(key);
        }
        if let Some(token) = get(ENV_CLOUDFLARE_TOKEN) {
            self.auth.cloudflare_api_token = Some(token);
        }
        if let Some(account) = get(ENV_ACCOUNT_ID) {
            self.defaults.account_id = Some(account);
        }
    }

    /// Write as TOML, creating parent directories. The file is left
    /// readable by the owner only.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(io_err)?;
        restrict_permissions(path).map_err(io_err)?;
        Ok(())
    }

    pub fn validate_required(&self) -> ConfigResult<()> {
        match self.openai_api_key() {
            Some(_) => Ok(()),
            None => Err(ConfigError::MissingOpenAiKey),
        }
    }

    /// Token and account id both present.
    pub fn has_cloudflare_config(&self) -> bool {
        self.cloudflare_api_token().is_some() && self.account_id().is_some()
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        non_empty(&self.auth.openai_api_key)
    }

    pub fn cloudflare_api_token(&self) -> Option<&str> {
        non_empty(&self.auth.cloudflare_api_token)
    }

    pub fn account_id(&self) -> Option<&str> {
        non_empty(&self.defaults.account_id)
    }

    pub fn default_zone(&self) -> Option<&str> {
        non_empty(&self.defaults.zone)
    }

    /// Chat-completions settings, if an API key is configured.
    pub fn openai(&self) -> Option<OpenAiConfig> {
        self.openai_api_key().map(|key| OpenAiConfig {
            api_key: key.to_string(),
            base_url: self.defaults.api_base.clone(),
            model: self.defaults.model_id.clone(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Interactive `ts init` prompts.
///
/// The OpenAI key is asked for until non-empty; the Cloudflare token is
/// optional, and account id and default zone are only asked for when a token
/// was given.
pub fn prompt_for_config<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> std::io::Result<Config> {
    let mut config = Config::default();

    loop {
        match ask(input, out, "Enter your OpenAI API key (required): ")? {
            Some(key) => {
                config.auth.openai_api_key = Some(key);
                break;
            }
            None => writeln!(out, "OpenAI API key is required to continue.")?,
        }
    }

    config.auth.cloudflare_api_token = ask(
        input,
        out,
        "Enter your Cloudflare API token (optional, press Enter to skip): ",
    )?;

    if config.auth.cloudflare_api_token.is_some() {
        config.defaults.account_id =
            ask(input, out, "Enter your Cloudflare account ID (optional): ")?;
        config.defaults.zone = ask(input, out, "Enter your default zone/domain (optional): ")?;
    }

    Ok(config)
}

/// One trimmed line; `None` when blank. End of input is an error so the
/// required-key loop cannot spin.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> std::io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed before configuration was complete",
        ));
    }
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}
