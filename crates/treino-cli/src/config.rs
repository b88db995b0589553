//! Configuration file management for treino.
//!
//! Provides a TOML-based config file at `~/.config/treino/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use treino_core::model::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig};

/// Env var overriding the model name.
pub const MODEL_ENV: &str = "TREINO_MODEL";
/// Env var overriding the listen address.
pub const BIND_ENV: &str = "TREINO_BIND";
/// Env var overriding the listen port.
pub const PORT_ENV: &str = "TREINO_PORT";

/// Env var holding the API key unless the config file names another.
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub name: String,
    /// Name of the env var holding the API key. The key itself is never
    /// written to the config file.
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the treino config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/treino` or `~/.config/treino`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("treino");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("treino")
}

/// Return the path to the treino config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreinoConfig {
    pub model: String,
    pub api_key_env: String,
    pub base_url: String,
    pub bind: String,
    pub port: u16,
}

impl TreinoConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Model: `cli_model` > `TREINO_MODEL` > `model.name` > `gemini-2.5-flash`
    /// - Bind: `cli_bind` > `TREINO_BIND` > `server.bind` > `127.0.0.1`
    /// - Port: `cli_port` > `TREINO_PORT` > `server.port` > `5000`
    ///
    /// A missing config file is fine; an unreadable or malformed one is an
    /// error.
    pub fn resolve(
        cli_model: Option<&str>,
        cli_bind: Option<&str>,
        cli_port: Option<u16>,
    ) -> Result<Self> {
        let file = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };

        let model = cli_model
            .map(str::to_string)
            .or_else(|| env_value(MODEL_ENV))
            .unwrap_or(file.model.name);

        let bind = cli_bind
            .map(str::to_string)
            .or_else(|| env_value(BIND_ENV))
            .unwrap_or(file.server.bind);

        let port = match (cli_port, env_value(PORT_ENV)) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .parse()
                .with_context(|| format!("{PORT_ENV} is not a valid port: {raw:?}"))?,
            (None, None) => file.server.port,
        };

        Ok(Self {
            model,
            api_key_env: file.model.api_key_env,
            base_url: file
                .model
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind,
            port,
        })
    }

    /// Read the API key from the configured env var.
    pub fn api_key(&self) -> Result<String> {
        match env_value(&self.api_key_env) {
            Some(key) => Ok(key),
            None => bail!(
                "API key not found; set {} in the environment or in a .env file",
                self.api_key_env
            ),
        }
    }

    /// Backend settings for the model commands. Fails without an API key.
    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        Ok(GeminiConfig {
            model: self.model.clone(),
            api_key: self.api_key()?,
            base_url: self.base_url.clone(),
        })
    }
}

/// Non-empty value of an env var.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
