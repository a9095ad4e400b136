use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

/// Everything the server reads at startup. Module sections stay untyped here;
/// each module deserializes its own.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Listener, limits and home directory.
    pub server: ServerConfig,
    /// Per-target log routing. `None` means plain console output.
    pub logging: Option<LoggingConfig>,
    /// Remote providers: auth + storage backend and the two model backends.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Optional directory of `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Raw module sections keyed by module name.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Absolute after loading.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Handler timeout; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default)]
    pub enable_docs: bool,
}

/// Connection settings for the auth + object storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupabaseConfig {
    pub url: String,
    /// Name of the environment variable holding the project (anon) key.
    #[serde(default = "default_supabase_key_env")]
    pub anon_key_env: String,
}

/// One OpenAI-compatible chat-completions backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    pub supabase: SupabaseConfig,
    /// General-purpose text model used by `/api/generate`.
    pub text_model: ModelConfig,
    /// Document-capable model used for PDF summaries.
    pub vision_model: ModelConfig,
}

/// Log sections keyed by target prefix (`profiles`, `assistant`, ...).
/// `default` receives everything no other section claims.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// trace | debug | info | warn | error | off
    pub console_level: String,
    /// Relative to `server.home_dir`; empty disables file output.
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => $HOME/.folio (or %APPDATA%/.folio)
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8087,
            timeout_sec: 0,
            body_limit_mb: default_body_limit_mb(),
            cors_enabled: false,
            enable_docs: false,
        }
    }
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:54321".to_string(),
            anon_key_env: default_supabase_key_env(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            supabase: SupabaseConfig::default(),
            text_model: ModelConfig {
                base_url: "https://api.x.ai/v1".to_string(),
                model: "grok-beta".to_string(),
                api_key_env: "XAI_API_KEY".to_string(),
            },
            vision_model: ModelConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key_env: "GOOGLE_GENERATIVE_AI_API_KEY".to_string(),
            },
        }
    }
}

impl SupabaseConfig {
    /// Read the project key from the configured environment variable.
    pub fn anon_key(&self) -> Result<String> {
        read_secret(&self.anon_key_env)
    }
}

impl ModelConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        read_secret(&self.api_key_env)
    }
}

fn read_secret(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("environment variable {var} is not set"))
}

fn default_body_limit_mb() -> usize {
    16
}

fn default_supabase_key_env() -> String {
    "SUPABASE_KEY".to_string()
}

/// Console at info, everything at debug in `logs/folio.log`.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/folio.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            providers: ProvidersConfig::default(),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file, then `APP__*` variables. The file must exist.
    /// `server.home_dir` comes back absolute and created.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        anyhow::ensure!(
            config_path.is_file(),
            "config file not found: {}",
            config_path.display()
        );

        // Logging stays None unless YAML/ENV provide it.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // APP__SERVER__PORT=8087 maps to server.port
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .context("Failed to extract config from figment")?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, dir)?;
        }

        Ok(config)
    }

    /// Without a path, defaults only (home dir still resolved).
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)
                    .context("Failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// `--port` replaces the port; `-v`/`-vv` raise the default console level.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }
}

/// Flags shared between the binary and the config layer.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

/// Read-only view over the per-module configuration bag.
#[derive(Debug, Clone)]
pub struct AppConfigProvider {
    config: AppConfig,
}

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.config.modules.get(module_name)
    }
}

const DEFAULT_SUBDIR: &str = ".folio";

fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let opt = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved: PathBuf =
        resolve_home_dir(opt, DEFAULT_SUBDIR, true).context("home_dir normalization failed")?;

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}

fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    use std::fs;
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if ext != "yml" && ext != "yaml" {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("cannot read module config {}", path.display()))?;
        let val: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        bag.insert(name.to_string(), serde_json::to_value(val)?);
    }
    Ok(())
}
