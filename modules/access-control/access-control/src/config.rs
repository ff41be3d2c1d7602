//! Configuration for the access-control module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Permission matrix given by name: `role -> resource -> [action]`.
///
/// Roles or resources left out get no actions.
pub type PermissionMatrixConfig = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Module configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessControlConfig {
    /// Full replacement for the built-in matrix. `None` selects the built-in one.
    pub matrix: Option<PermissionMatrixConfig>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_document_selects_builtin_matrix() {
        let cfg: AccessControlConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(cfg, AccessControlConfig::default());
        assert!(cfg.matrix.is_none());
    }

    #[test]
    fn matrix_override_parses_from_yaml() {
        let yaml = r"
matrix:
  front_desk:
    patient: [view, create]
    appointment: [view, schedule_appointment]
  technician: {}
";
        let cfg: AccessControlConfig = serde_saphyr::from_str(yaml).unwrap();
        let matrix = cfg.matrix.unwrap();
        assert_eq!(matrix["front_desk"]["patient"], vec!["view", "create"]);
        assert!(matrix["technician"].is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<AccessControlConfig, _> = serde_saphyr::from_str("mode: allow_all\n");
        assert!(result.is_err());
    }
}
