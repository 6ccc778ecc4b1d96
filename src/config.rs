use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::aggregate::{CategoryCeilings, IntensityScale, default_ceiling};
use crate::category::CategoryKey;
use crate::error::ConfigError;
use crate::ledgers::state_dir;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    intensity_thresholds: Option<Vec<Decimal>>,
    ceilings: BTreeMap<String, Decimal>,
    log_level: Option<String>,
}

#[derive(Debug, Serialize)]
struct EffectiveSettings {
    intensity_thresholds: Vec<f64>,
    log_level: Option<String>,
    ceilings: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub scale: IntensityScale,
    pub ceilings: CategoryCeilings,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(raw)?;

        let scale = match file.intensity_thresholds {
            Some(thresholds) => IntensityScale::new(thresholds)?,
            None => IntensityScale::default(),
        };

        let mut ceilings = CategoryKey::ALL
            .into_iter()
            .map(|key| (key, default_ceiling(key)))
            .collect::<BTreeMap<_, _>>();
        for (id, hours) in file.ceilings {
            let key = id
                .parse::<CategoryKey>()
                .map_err(|_| ConfigError::UnknownCategory(id.clone()))?;
            ceilings.insert(key, hours);
        }

        Ok(Self {
            scale,
            ceilings: CategoryCeilings::new(ceilings),
            log_level: file.log_level,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let effective = EffectiveSettings {
            intensity_thresholds: self
                .scale
                .thresholds()
                .iter()
                .filter_map(ToPrimitive::to_f64)
                .collect(),
            log_level: self.log_level.clone(),
            ceilings: self
                .ceilings
                .iter()
                .filter_map(|(key, hours)| Some((key.id().to_string(), hours.to_f64()?)))
                .collect(),
        };
        Ok(toml::to_string_pretty(&effective)?)
    }
}

pub fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    if let Some(path) = env::var_os("LIFE_HEATMAP_CONFIG") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    state_dir().join(CONFIG_FILE)
}

/// Loads settings, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(raw) => Settings::from_toml(&raw),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Settings, load_settings};
    use crate::category::CategoryKey;
    use crate::error::ConfigError;

    fn hours(text: &str) -> Decimal {
        text.parse().expect("valid decimal")
    }

    #[test]
    fn reads_thresholds_and_partial_ceilings() {
        let settings = Settings::from_toml(
            r#"
intensity_thresholds = [0, 4, 7.5]
log_level = "debug"

[ceilings]
gym = 12.5
"#,
        )
        .expect("config should parse");

        assert_eq!(
            settings.scale.thresholds(),
            &[hours("0"), hours("4"), hours("7.5")]
        );
        assert_eq!(settings.ceilings.get(CategoryKey::Gym), Some(hours("12.5")));
        assert_eq!(settings.ceilings.get(CategoryKey::Deep), Some(hours("60")));
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn empty_file_means_defaults() {
        let settings = Settings::from_toml("").expect("empty config");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn rejects_bad_thresholds_and_categories() {
        assert!(matches!(
            Settings::from_toml("intensity_thresholds = [8, 2]"),
            Err(ConfigError::InvalidThresholds)
        ));
        assert!(matches!(
            Settings::from_toml("[ceilings]\nchess = 3"),
            Err(ConfigError::UnknownCategory(id)) if id == "chess"
        ));
    }

    #[test]
    fn effective_settings_round_trip() {
        let settings = Settings::default();
        let raw = settings.to_toml().expect("encode");
        assert!(raw.contains("intensity_thresholds"));
        assert_eq!(Settings::from_toml(&raw).expect("decode"), settings);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = load_settings(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(settings, Settings::default());
    }
}
