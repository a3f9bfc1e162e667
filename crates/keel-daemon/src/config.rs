use std::path::{Path, PathBuf};

use keel_scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "KEEL_CONFIG";

/// Overrides `manifest_dir`.
pub const MANIFEST_DIR_ENV: &str = "KEEL_MANIFEST_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeelConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Directory of delivery config manifests (`*.json`) submitted at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_dir: Option<PathBuf>,
    /// Per-subscriber notification backlog before old notifications are dropped.
    #[serde(default = "default_notification_buffer")]
    pub notification_buffer: usize,
}

fn default_notification_buffer() -> usize {
    1024
}

impl Default for KeelConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            scheduler: SchedulerConfig::default(),
            manifest_dir: None,
            notification_buffer: default_notification_buffer(),
        }
    }
}

impl KeelConfig {
    /// `KEEL_MANIFEST_DIR` wins over the file setting.
    pub fn resolve_manifest_dir(&self, env_value: Option<String>) -> Option<PathBuf> {
        env_value
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.manifest_dir.clone())
    }
}

/// `KEEL_CONFIG` if set, else `<config_dir>/keel/config.json`.
pub fn config_path() -> eyre::Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("keel").join("config.json"))
}

/// Load and migrate the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> eyre::Result<KeelConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return Ok(KeelConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));

    let migrated = migrate(json, on_disk_version)?;
    let config: KeelConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update keel."
        ));
    }

    // v0 → v1: cycle settings moved from the top level under `scheduler`
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        let mut scheduler = serde_json::Map::new();
        for cycle in ["resources", "environments", "artifacts", "agents"] {
            if let Some(value) = obj.remove(cycle) {
                scheduler.insert(cycle.to_string(), value);
            }
        }
        if !scheduler.is_empty() {
            obj.entry("scheduler")
                .or_insert(serde_json::Value::Object(scheduler));
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (nested cycle settings under scheduler)");
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}

pub fn save_config(path: &Path, config: &KeelConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent directory", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
