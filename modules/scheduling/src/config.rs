//! Configuration for the scheduling module and process assembly.

use std::path::Path;

use access_control::AccessControlConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment prefix for overrides, e.g. `CAREPATH_SCHEDULING__MAX_PAGE_SIZE=50`.
pub const ENV_PREFIX: &str = "CAREPATH_";

/// List and search limits shared by every entity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Search terms shorter than this are ignored.
    pub search_min_length: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            search_min_length: 1,
        }
    }
}

/// Top-level process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub access_control: AccessControlConfig,
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    /// Defaults, then the YAML file at `path`, then `CAREPATH_` environment
    /// variables (`__` separates nested keys).
    ///
    /// # Errors
    ///
    /// Returns the figment error if a source cannot be read or does not match
    /// the schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Self::figment()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Defaults overlaid with an in-memory YAML document.
    ///
    /// # Errors
    ///
    /// Returns the figment error if the document does not match the schema.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, figment::Error> {
        Self::figment().merge(Yaml::string(yaml)).extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn scheduling_defaults() {
        let cfg = SchedulingConfig::default();
        assert_eq!(cfg.default_page_size, 10);
        assert_eq!(cfg.max_page_size, 100);
        assert_eq!(cfg.search_min_length, 1);
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let cfg: SchedulingConfig = serde_saphyr::from_str("max_page_size: 50\n").unwrap();
        assert_eq!(cfg.max_page_size, 50);
        assert_eq!(cfg.default_page_size, 10);
    }

    #[test]
    fn unknown_scheduling_fields_are_rejected() {
        let result: Result<SchedulingConfig, _> = serde_saphyr::from_str("page_size: 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn app_config_merges_yaml_over_defaults() {
        let yaml = r"
scheduling:
  default_page_size: 25
access_control:
  matrix:
    technician:
      booking: [view]
";
        let cfg = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.scheduling.default_page_size, 25);
        assert_eq!(cfg.scheduling.max_page_size, 100);
        let matrix = cfg.access_control.matrix.unwrap();
        assert_eq!(matrix["technician"]["booking"], vec!["view"]);
    }

    #[test]
    fn empty_yaml_is_the_default_config() {
        let cfg = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load("/nonexistent/carepath.yaml").unwrap();
        assert_eq!(cfg.scheduling, SchedulingConfig::default());
    }
}
