//! Loader for the checker configuration with YAML + environment overlays.
//!
//! Every field has a built-in default, so a bare run needs no config file
//! at all and watches the stock target. Precedence, later wins: defaults,
//! then an optional YAML file, then `PAGEWATCH_`-prefixed environment
//! variables. `${VAR}` placeholders in string values are expanded
//! recursively before the typed config materialises.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// The page watched when no config overrides it.
pub const DEFAULT_URL: &str = "https://marutomi-fudousan.com/information.html";

/// Fetch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Relative path of the single-fingerprint state file.
pub const DEFAULT_STATE_FILE: &str = "state.txt";

/// Runtime configuration for one checker run.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// URL of the page to check.
    #[serde(default = "default_url")]
    pub url: String,
    /// Hard timeout for the single HTTP GET.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Path of the persisted fingerprint file.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Results file the `changed=`/`snippet=` lines are appended to.
    /// When unset, `GITHUB_OUTPUT` from the calling environment is used.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            state_file: default_state_file(),
            output_path: None,
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct WatchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for WatchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchConfigLoader {
    /// Start with the built-in defaults plus `PAGEWATCH_` env overrides.
    ///
    /// ```
    /// use pagewatch_config::{WatchConfigLoader, DEFAULT_TIMEOUT_SECS};
    ///
    /// let cfg = WatchConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    /// assert!(cfg.output_path.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix. The file must exist; callers only pass explicit paths.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests to merge inline YAML snippets.
    ///
    /// ```
    /// use pagewatch_config::WatchConfigLoader;
    ///
    /// let cfg = WatchConfigLoader::new()
    ///     .with_yaml_str("url: \"https://example.com/news.html\"\ntimeout_secs: 10")
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.url, "https://example.com/news.html");
    /// assert_eq!(cfg.timeout_secs, 10);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into the
    /// strongly typed config, expanding `${VAR}` placeholders first.
    pub fn load(self) -> Result<WatchConfig, ConfigError> {
        // The env source is merged here, after any file sources, because
        // config-rs gives later sources precedence and env must win.
        // try_parsing so PAGEWATCH_TIMEOUT_SECS=5 lands as a number.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("PAGEWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: WatchConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
