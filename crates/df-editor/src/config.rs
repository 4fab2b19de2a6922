//! Editor configuration loaded from YAML.

use std::path::Path;

use df_expr::Analyzer;
use df_graph::DEFAULT_OUTLET;
use df_model::ModelSettings;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Defaults for new nodes and the link policy.
///
/// Every field is optional in YAML; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// Expression given to newly created nodes.
    pub default_expression: String,
    /// Base for generated node names; its trailing number is bumped.
    pub node_name_base: String,
    /// Name of the outlet every node gets.
    pub default_outlet: String,
    pub allow_cycles: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let settings = ModelSettings::default();
        Self {
            default_expression: settings.default_expression,
            node_name_base: settings.node_name_base,
            default_outlet: DEFAULT_OUTLET.to_string(),
            allow_cycles: settings.allow_cycles,
        }
    }
}

impl EditorConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: EditorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.node_name_base.trim().is_empty() {
            return Err(ConfigError::Invalid {
                what: "node_name_base is empty".to_string(),
            });
        }
        if self.default_outlet.trim().is_empty() {
            return Err(ConfigError::Invalid {
                what: "default_outlet is empty".to_string(),
            });
        }
        if let Err(err) = Analyzer::parse(&self.default_expression) {
            return Err(ConfigError::Invalid {
                what: format!("default_expression: {err}"),
            });
        }
        Ok(())
    }

    /// Settings handed to the model.
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            node_name_base: self.node_name_base.clone(),
            default_expression: self.default_expression.clone(),
            allow_cycles: self.allow_cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.default_expression, "x+y");
        assert_eq!(config.node_name_base, "n1");
        assert_eq!(config.default_outlet, "result");
        assert!(!config.allow_cycles);
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = EditorConfig::from_yaml_str("allow_cycles: true\ndefault_expression: a*b\n").unwrap();
        assert!(config.allow_cycles);
        assert_eq!(config.default_expression, "a*b");
        assert_eq!(config.default_outlet, "result");
        assert_eq!(config.model_settings().default_expression, "a*b");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EditorConfig::from_yaml_str("default_expression: 'x +'"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            EditorConfig::from_yaml_str("node_name_base: ''"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            EditorConfig::from_yaml_str("allow_cycles: [1"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            EditorConfig::load(Path::new("/nonexistent/dagflow.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
