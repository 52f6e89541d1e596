use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";
pub const ENV_PREFIX: &str = "KIOSK_ANOMALY_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default TOML file and the environment.
    ///
    /// Missing files are not an error; built-in defaults fill any gaps.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a specific TOML file, then the environment.
    ///
    /// Nested keys use `__` in variable names, e.g. `KIOSK_ANOMALY_ANALYSIS__PERIOD=14`.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Self::figment(path.as_ref()).extract()?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "Loaded configuration");
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("does/not/exist.toml").unwrap();
            assert_eq!(config.analysis.period, 7);
            assert_eq!(config.data.path, "data/items_purchased.csv");
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [data]
                path = "purchases.csv"

                [analysis]
                period = 14
                threshold = 3.0
                "#,
            )?;
            jail.set_env("KIOSK_ANOMALY_ANALYSIS__PERIOD", "28");

            let config = ConfigLoader::load_from("Config.toml").unwrap();
            assert_eq!(config.data.path, "purchases.csv");
            assert_eq!(config.data.kiosk_column, "kiosk_id");
            assert_eq!(config.analysis.period, 28);
            assert!((config.analysis.threshold - 3.0).abs() < f64::EPSILON);
            assert!(config.analysis.causal);
            Ok(())
        });
    }
}
