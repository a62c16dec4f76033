use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "checkwise.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Contents of `checkwise.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CheckwiseConfig {
    /// Where run logs are written. Relative paths are relative to the
    /// project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Set to `false` to disable run logging for this project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_log: Option<bool>,

    /// Tool names (as recorded in run logs) that never run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_tools: Vec<String>,

    /// Extra excluded directories: plain names match at any depth, values
    /// containing `/` are root-relative paths.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Set to `false` to drop the built-in exclusion list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_excludes: Option<bool>,
}

/// Loads `checkwise.toml` from `root`, or the defaults if there is none.
///
/// # Errors
///
/// * If the file exists but cannot be read
/// * If the file is not valid TOML or has unknown keys
pub fn load_config(root: &Path) -> Result<CheckwiseConfig, ConfigError> {
    let path = root.join(CONFIG_FILE_NAME);

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No {CONFIG_FILE_NAME} in {}", root.display());
            return Ok(CheckwiseConfig::default());
        }
        Err(e) => return Err(e.into()),
    };

    let config = toml::from_str(&contents)?;
    log::debug!("Loaded {}: {config:?}", path.display());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn missing_file_is_the_default_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), CheckwiseConfig::default());
    }

    #[test_log::test]
    fn parses_kebab_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
            log-dir = "build/quality-logs"
            run-log = true
            skip-tools = ["mypy", "npm:audit"]
            exclude = ["generated", "vendor/third_party"]
            default-excludes = false
            "#,
        )
        .unwrap();

        assert_eq!(
            load_config(dir.path()).unwrap(),
            CheckwiseConfig {
                log_dir: Some(PathBuf::from("build/quality-logs")),
                run_log: Some(true),
                skip_tools: vec!["mypy".to_string(), "npm:audit".to_string()],
                exclude: vec!["generated".to_string(), "vendor/third_party".to_string()],
                default_excludes: Some(false),
            }
        );
    }

    #[test_log::test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "skip = [\"mypy\"]\n").unwrap();

        assert!(matches!(
            load_config(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
