mod defaults;
mod types;

pub use defaults::{CONFIG_VERSION, DEFAULT_CONFIG_FILE};
pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;
use tracing::debug;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            report_dir: default_report_dir(),
            concurrency: default_concurrency(),
            include: default_include(),
            exclude: Vec::new(),
            parser: ParserConfig::default(),
            envelope: EnvelopeConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config, falling back to defaults when the default config file is absent.
    /// An explicitly named file must exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() && path == Path::new(DEFAULT_CONFIG_FILE) {
            debug!("No {} found, using default config", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {} (expected {})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if self.parser.anchor_section.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "parser.anchor_section must not be empty".to_string(),
            ));
        }

        if self.parser.finding_marker.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "parser.finding_marker must not be empty".to_string(),
            ));
        }

        if self.include.is_empty() {
            return Err(ConfigError::Invalid(
                "include must list at least one pattern".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BreakRule;
    use std::path::PathBuf;

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
concurrency: 2
parser:
  break_rule: every_bullet
  table_header: Risk
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.report_dir, PathBuf::from("reports"));
        assert_eq!(config.parser.break_rule, BreakRule::EveryBullet);
        assert_eq!(config.parser.table_header.as_deref(), Some("Risk"));
        assert_eq!(config.parser.anchor_section, "EXECUTIVE SUMMARY");
        assert!(config.parser.strip_json_blocks);
        assert_eq!(config.envelope.anchor_phrases.len(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let config: Config = serde_yaml::from_str("version: 2\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported config version 2"));

        let config: Config = serde_yaml::from_str("version: 1\n").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = Config::load_or_default(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reportlens.yaml");
        std::fs::write(&path, "report_dir: out\nexclude: [\"drafts/**\"]\n").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.report_dir, PathBuf::from("out"));
        assert_eq!(config.exclude, vec!["drafts/**"]);
    }
}
