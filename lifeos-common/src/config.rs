//! Bootstrap configuration loading
//!
//! Settings are resolved in this priority order:
//! 1. Command-line argument / environment variable (collected by the binary into [`ConfigOverrides`])
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing TOML file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Origins allowed by CORS when nothing else is configured (local dev + preview servers)
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:4173"];

/// Default generative model used for AI calls
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";

/// Default base URL of the generative language REST API
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bootstrap configuration as read from the TOML file
///
/// Every field is optional; absent values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub environment: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_expire_days: Option<i64>,
    pub cookie_secure: Option<bool>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub frontend_url: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub public_url: Option<String>,
    #[serde(default)]
    pub ai: AiToml,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[ai]` section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiToml {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
///
/// These take precedence over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub environment: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_expire_days: Option<i64>,
    pub frontend_url: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub public_url: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: Option<String>,
    pub log_level: Option<String>,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub port: u16,
    pub database_path: PathBuf,
    pub environment: String,
    pub jwt_expire_days: i64,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            port: 3000,
            database_path: default_data_folder().join("lifeos.db"),
            environment: "development".to_string(),
            jwt_expire_days: 30,
            log_level: default_log_level(),
        }
    }
}

/// Generative AI provider settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` disables every AI call
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cookie_secure: bool,
    pub allowed_origins: Vec<String>,
    pub static_dir: Option<PathBuf>,
    pub public_url: String,
    pub ai: AiConfig,
    pub log_level: String,
}

impl ServerConfig {
    /// Merge overrides, TOML and compiled defaults into the effective configuration
    ///
    /// A JWT secret is mandatory in production. Elsewhere a random per-process secret is
    /// generated, which invalidates sessions on restart.
    pub fn resolve(overrides: ConfigOverrides, toml: Option<TomlConfig>) -> Result<Self> {
        let toml = toml.unwrap_or_default();
        let defaults = CompiledDefaults::for_current_platform();

        let environment = overrides
            .environment
            .or(toml.environment)
            .unwrap_or(defaults.environment);
        let is_production = environment == "production";

        let jwt_secret = match overrides.jwt_secret.or(toml.jwt_secret) {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ if is_production => {
                return Err(Error::Config(
                    "JWT secret is required in production (set JWT_SECRET or jwt_secret in config.toml)"
                        .to_string(),
                ));
            }
            _ => {
                warn!("No JWT secret configured, generating an ephemeral one (sessions end on restart)");
                generate_secret()
            }
        };

        let jwt_expire_days = overrides
            .jwt_expire_days
            .or(toml.jwt_expire_days)
            .unwrap_or(defaults.jwt_expire_days);
        if jwt_expire_days <= 0 {
            return Err(Error::Config(format!(
                "jwt_expire_days must be positive, got {}",
                jwt_expire_days
            )));
        }

        let port = overrides.port.or(toml.port).unwrap_or(defaults.port);

        let mut allowed_origins: Vec<String> = if toml.allowed_origins.is_empty() {
            DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
        } else {
            toml.allowed_origins
        };
        if let Some(frontend) = overrides.frontend_url.or(toml.frontend_url) {
            if !frontend.trim().is_empty() && !allowed_origins.contains(&frontend) {
                allowed_origins.push(frontend);
            }
        }

        let public_url = overrides
            .public_url
            .or(toml.public_url)
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let ai = AiConfig {
            api_key: overrides
                .ai_api_key
                .or(toml.ai.api_key)
                .filter(|k| !k.trim().is_empty()),
            model: overrides
                .ai_model
                .or(toml.ai.model)
                .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            base_url: toml
                .ai
                .base_url
                .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
        };

        Ok(Self {
            port,
            database_path: overrides
                .database_path
                .or(toml.database_path)
                .unwrap_or(defaults.database_path),
            cookie_secure: toml.cookie_secure.unwrap_or(is_production),
            environment,
            jwt_secret,
            jwt_expire_days,
            allowed_origins,
            static_dir: overrides.static_dir.or(toml.static_dir),
            public_url,
            ai,
            log_level: overrides
                .log_level
                .unwrap_or(toml.logging.level),
        })
    }
}

/// Load the TOML bootstrap file
///
/// With an explicit path the file must exist. Without one, `LIFEOS_CONFIG` and the
/// platform locations are probed and `Ok(None)` is returned when none exists.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<Option<TomlConfig>> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match find_config_file() {
            Some(path) => path,
            None => {
                warn!("No config.toml found, using defaults and environment");
                return Ok(None);
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(Some(config))
}

/// Probe `$LIFEOS_CONFIG`, then `~/.config/lifeos/config.toml`, then `/etc/lifeos/config.toml`
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("LIFEOS_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!("LIFEOS_CONFIG points to a missing file: {}", path.display());
    }

    let user_config = dirs::config_dir().map(|d| d.join("lifeos").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/lifeos/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent data folder (`~/.local/share/lifeos` on Linux)
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lifeos"))
        .unwrap_or_else(|| PathBuf::from("./lifeos_data"))
}

fn generate_secret() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
