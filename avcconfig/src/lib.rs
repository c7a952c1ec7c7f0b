//! # avcconfig - configuration for the AV control point
//!
//! The configuration is a YAML tree built from:
//! - an embedded default document,
//! - an optional `config.yaml` in the configuration directory,
//! - `AVC_CONFIG__section__key=value` environment overrides.
//!
//! ```no_run
//! use avcconfig::get_config;
//!
//! let config = get_config();
//! let interval = config.get_poll_interval();
//! let timeout = config.get_http_timeout();
//! # let _ = (interval, timeout);
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = include_str!("avcconfig.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(Config::load_or_default(""));
}

const ENV_CONFIG_DIR: &str = "AVC_CONFIG";
const ENV_PREFIX: &str = "AVC_CONFIG__";
const CONFIG_FILE: &str = "config.yaml";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_INSTANCE_ID: u32 = 0;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration manager.
///
/// Values are addressed by key paths (`&["control", "poll_interval_ms"]`).
/// Keys are stored lower-cased, so lookups are case-insensitive.
#[derive(Debug)]
pub struct Config {
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            data: Mutex::new(self.lock().clone()),
        }
    }
}

impl Config {
    fn find_config_dir(directory: &str) -> PathBuf {
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Using config directory from env");
            return PathBuf::from(env_path);
        }

        if Path::new(".avc").exists() {
            return PathBuf::from(".avc");
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(".avc");
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(".avc")
    }

    /// Loads the configuration from `directory` (or the default search path
    /// when empty), merged over the embedded defaults, with environment
    /// overrides applied last.
    ///
    /// A missing `config.yaml` is not an error.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        let path = config_dir.join(CONFIG_FILE);

        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut value, &lower_keys_value(external));
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using embedded defaults");
            }
        }

        apply_overrides(&mut value, env::vars());

        Ok(Config {
            path: Some(path),
            data: Mutex::new(value),
        })
    }

    /// Builds a configuration from a YAML document merged over the embedded
    /// defaults. Nothing is read from or written to disk.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !yaml.trim().is_empty() {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut value, &lower_keys_value(external));
        }
        Ok(Config {
            path: None,
            data: Mutex::new(value),
        })
    }

    fn load_or_default(directory: &str) -> Self {
        match Self::load_config(directory) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Failed to load configuration, using embedded defaults");
                let value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap_or(Value::Null);
                Config {
                    path: None,
                    data: Mutex::new(value),
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Writes the current configuration to `config.yaml`, creating the
    /// configuration directory if needed.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            debug!("Configuration has no backing file, nothing to save");
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(&*self.lock())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a value in memory. Call [`Config::save`] to persist it.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.lock();
        set_value_internal(&mut data, path, value)
    }

    /// Gets the value at `path`, or an error if the path does not exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock();
        get_value_internal(&data, path)
    }

    fn get_u64(&self, path: &[&str], default: u64) -> u64 {
        match self.get_value(path) {
            Ok(Value::Number(n)) if n.as_u64().is_some() => n.as_u64().unwrap_or(default),
            Ok(Value::String(s)) => s.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(key = %path.join("."), value = %s, default, "Invalid integer, using default");
                default
            }),
            Ok(other) => {
                warn!(key = %path.join("."), value = ?other, default, "Not an integer, using default");
                default
            }
            Err(_) => default,
        }
    }

    /// Interval between two reconciliation ticks.
    pub fn get_poll_interval(&self) -> Duration {
        let ms = self.get_u64(&["control", "poll_interval_ms"], DEFAULT_POLL_INTERVAL_MS);
        if ms == 0 {
            warn!("control.poll_interval_ms must be positive, using default");
            return Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
        }
        Duration::from_millis(ms)
    }

    pub fn set_poll_interval(&self, interval: Duration) -> Result<()> {
        let ms = u64::try_from(interval.as_millis())
            .map_err(|_| anyhow!("poll interval is too large"))?;
        self.set_value(&["control", "poll_interval_ms"], Value::Number(Number::from(ms)))
    }

    /// Timeout applied to every request sent to a renderer.
    pub fn get_http_timeout(&self) -> Duration {
        let secs = self.get_u64(&["upnp", "http_timeout_secs"], DEFAULT_HTTP_TIMEOUT_SECS);
        if secs == 0 {
            warn!("upnp.http_timeout_secs must be positive, using default");
            return Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS);
        }
        Duration::from_secs(secs)
    }

    /// AVTransport `InstanceID` used for every transport action.
    pub fn get_instance_id(&self) -> u32 {
        let raw = self.get_u64(&["upnp", "instance_id"], DEFAULT_INSTANCE_ID as u64);
        u32::try_from(raw).unwrap_or_else(|_| {
            warn!(value = raw, "upnp.instance_id out of range, using default");
            DEFAULT_INSTANCE_ID
        })
    }

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub fn get_log_filter(&self) -> String {
        match self.get_value(&["logger", "filter"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => DEFAULT_LOG_FILTER.to_string(),
        }
    }

    pub fn set_log_filter(&self, filter: &str) -> Result<()> {
        self.set_value(&["logger", "filter"], Value::String(filter.to_string()))
    }
}

/// Returns the global configuration, loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

/// Applies `AVC_CONFIG__a__b=value` pairs onto the tree.
fn apply_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path: Vec<&str> = stripped.split("__").collect();
        if let Err(err) = set_value_internal(config, &key_path, convert_env_value(&value)) {
            warn!(env_var = %key, error = %err, "Ignoring configuration override");
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let k = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(k, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Recursively merges `external` into `default`. Mappings are merged key by
/// key; scalars and sequences are replaced.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_embedded_document() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config.get_poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.get_http_timeout(), Duration::from_secs(5));
        assert_eq!(config.get_instance_id(), 0);
        assert_eq!(config.get_log_filter(), "info");
    }

    #[test]
    fn external_document_is_merged_case_insensitively() {
        let config = Config::from_yaml_str("Control:\n  Poll_Interval_MS: 250\n").unwrap();
        assert_eq!(config.get_poll_interval(), Duration::from_millis(250));
        // untouched sibling sections survive the merge
        assert_eq!(config.get_http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config =
            Config::from_yaml_str("control:\n  poll_interval_ms: soon\nupnp:\n  instance_id: -3\n")
                .unwrap();
        assert_eq!(config.get_poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.get_instance_id(), 0);

        let config = Config::from_yaml_str("control:\n  poll_interval_ms: 0\n").unwrap();
        assert_eq!(config.get_poll_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_http_timeout_falls_back_to_default() {
        let config = Config::from_yaml_str("upnp:\n  http_timeout_secs: 0\n").unwrap();
        assert_eq!(config.get_http_timeout(), Duration::from_secs(5));

        let config = Config::from_yaml_str("upnp:\n  http_timeout_secs: 12\n").unwrap();
        assert_eq!(config.get_http_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn overrides_use_prefix_and_double_underscores() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        apply_overrides(
            &mut value,
            vec![
                ("AVC_CONFIG__UPNP__HTTP_TIMEOUT_SECS".to_string(), "12".to_string()),
                ("AVC_CONFIG__logger__filter".to_string(), "avccontrol=debug".to_string()),
                ("UNRELATED".to_string(), "1".to_string()),
            ],
        );
        let config = Config {
            path: None,
            data: Mutex::new(value),
        };
        assert_eq!(config.get_http_timeout(), Duration::from_secs(12));
        assert_eq!(config.get_log_filter(), "avccontrol=debug");
    }

    #[test]
    fn set_and_get_value_round_trip_through_paths() {
        let config = Config::from_yaml_str("").unwrap();
        config.set_poll_interval(Duration::from_millis(500)).unwrap();
        assert_eq!(config.get_poll_interval(), Duration::from_millis(500));

        config
            .set_value(&["extra", "nested", "key"], Value::Bool(true))
            .unwrap();
        assert_eq!(
            config.get_value(&["EXTRA", "nested", "key"]).unwrap(),
            Value::Bool(true)
        );
        assert!(config.get_value(&["missing"]).is_err());
    }

    #[test]
    fn save_without_backing_file_is_a_no_op() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(config.save().is_ok());
    }
}
