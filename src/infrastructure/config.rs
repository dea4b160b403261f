use crate::infrastructure::error::PlannerError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const ALARMS_JSON: &str = "alarms.json";
const SCHEDULE_JSON: &str = "schedule.json";

const DEFAULT_FAST_TICK_SECONDS: u64 = 1;
const DEFAULT_SLOW_TICK_SECONDS: u64 = 60;

#[derive(Debug)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub alarms: serde_json::Value,
    pub schedule: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmSettings {
    pub enabled: bool,
    pub sound_url: Option<String>,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSettings {
    pub fast_tick_seconds: u64,
    pub slow_tick_seconds: u64,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            fast_tick_seconds: DEFAULT_FAST_TICK_SECONDS,
            slow_tick_seconds: DEFAULT_SLOW_TICK_SECONDS,
        }
    }
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "Dayplan"
            }),
        ),
        (
            ALARMS_JSON,
            serde_json::json!({
                "schema": 1,
                "enabled": true,
                "soundUrl": null
            }),
        ),
        (
            SCHEDULE_JSON,
            serde_json::json!({
                "schema": 1,
                "fastTickSeconds": DEFAULT_FAST_TICK_SECONDS,
                "slowTickSeconds": DEFAULT_SLOW_TICK_SECONDS
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), PlannerError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, PlannerError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| {
            PlannerError::InvalidConfig(format!("missing schema in {}", path.display()))
        })?;
    if schema != 1 {
        return Err(PlannerError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, PlannerError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        alarms: read_config(&config_dir.join(ALARMS_JSON))?,
        schedule: read_config(&config_dir.join(SCHEDULE_JSON))?,
    })
}

pub fn read_app_name(config_dir: &Path) -> Result<String, PlannerError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    let name = app
        .get("appName")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("Dayplan");
    Ok(name.to_string())
}

pub fn read_alarm_settings(config_dir: &Path) -> Result<AlarmSettings, PlannerError> {
    let parsed = read_config(&config_dir.join(ALARMS_JSON))?;
    let mut settings = AlarmSettings::default();

    if let Some(enabled) = parsed.get("enabled").and_then(serde_json::Value::as_bool) {
        settings.enabled = enabled;
    }
    settings.sound_url = parsed
        .get("soundUrl")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    Ok(settings)
}

/// Tick cadences in seconds; the slow tick is clamped to at most a minute.
pub fn read_tick_settings(config_dir: &Path) -> Result<TickSettings, PlannerError> {
    let parsed = read_config(&config_dir.join(SCHEDULE_JSON))?;
    let mut settings = TickSettings::default();

    if let Some(value) = parsed
        .get("fastTickSeconds")
        .and_then(serde_json::Value::as_u64)
    {
        settings.fast_tick_seconds = value.max(1);
    }
    if let Some(value) = parsed
        .get("slowTickSeconds")
        .and_then(serde_json::Value::as_u64)
    {
        settings.slow_tick_seconds = value.clamp(1, 60);
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct TempConfigDir {
        path: PathBuf,
    }

    impl TempConfigDir {
        fn new(label: &str) -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock after epoch")
                .as_nanos();
            let path = std::env::temp_dir().join(format!("dayplan-config-{nanos}-{label}"));
            fs::create_dir_all(&path).expect("create temp config dir");
            Self { path }
        }
    }

    impl Drop for TempConfigDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn ensure_default_configs_writes_all_files_once() {
        let dir = TempConfigDir::new("defaults");
        ensure_default_configs(&dir.path).expect("write defaults");

        for name in [APP_JSON, ALARMS_JSON, SCHEDULE_JSON] {
            assert!(dir.path.join(name).exists(), "missing {name}");
        }

        let bundle = load_configs(&dir.path).expect("load configs");
        assert_eq!(bundle.app["appName"], "Dayplan");
        assert_eq!(bundle.alarms["enabled"], true);
    }

    #[test]
    fn ensure_default_configs_does_not_overwrite_existing_files() {
        let dir = TempConfigDir::new("no-overwrite");
        fs::write(
            dir.path.join(ALARMS_JSON),
            r#"{"schema":1,"enabled":false,"soundUrl":"bell.wav"}"#,
        )
        .expect("seed alarms config");

        ensure_default_configs(&dir.path).expect("write defaults");
        let settings = read_alarm_settings(&dir.path).expect("read alarm settings");

        assert!(!settings.enabled);
        assert_eq!(settings.sound_url.as_deref(), Some("bell.wav"));
    }

    #[test]
    fn read_config_rejects_unsupported_schema() {
        let dir = TempConfigDir::new("bad-schema");
        fs::write(dir.path.join(APP_JSON), r#"{"schema":2,"appName":"X"}"#)
            .expect("seed app config");

        let result = read_app_name(&dir.path);
        assert!(matches!(result, Err(PlannerError::InvalidConfig(_))));
    }

    #[test]
    fn read_tick_settings_clamps_cadences() {
        let dir = TempConfigDir::new("tick-clamp");
        fs::write(
            dir.path.join(SCHEDULE_JSON),
            r#"{"schema":1,"fastTickSeconds":0,"slowTickSeconds":600}"#,
        )
        .expect("seed schedule config");

        let settings = read_tick_settings(&dir.path).expect("read tick settings");
        assert_eq!(settings.fast_tick_seconds, 1);
        assert_eq!(settings.slow_tick_seconds, 60);
    }

    #[test]
    fn read_tick_settings_falls_back_to_defaults_for_missing_fields() {
        let dir = TempConfigDir::new("tick-defaults");
        fs::write(dir.path.join(SCHEDULE_JSON), r#"{"schema":1}"#).expect("seed schedule config");

        let settings = read_tick_settings(&dir.path).expect("read tick settings");
        assert_eq!(settings, TickSettings::default());
    }
}
