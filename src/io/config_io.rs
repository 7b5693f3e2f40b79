use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::{AppConfig, parse_utc_offset};

pub const CONFIG_FILE: &str = "questlog.toml";

const CONFIG_TEMPLATE: &str = r##"# Directory holding users.json, projects.json and tasks.json.
# Relative paths resolve against this file's directory.
data_dir = "database"

# UTC offset used for timestamps when a user has no timezone of their own.
default_timezone = "{timezone}"

# Youngest age, in whole years, allowed to hold an account.
min_age_years = 13
"##;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid default_timezone {0:?}: expected a UTC offset like +06:00")]
    InvalidTimezone(String),
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Read the config at `path`. A missing file yields the defaults; a
/// relative `data_dir` is resolved against the file's directory.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = path.parent().unwrap_or(Path::new("."));
    if !path.exists() {
        let mut config = AppConfig::default();
        config.data_dir = base.join(&config.data_dir);
        return Ok(config);
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut config: AppConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if parse_utc_offset(&config.default_timezone).is_none() {
        return Err(ConfigError::InvalidTimezone(config.default_timezone));
    }
    if config.data_dir.is_relative() {
        config.data_dir = base.join(&config.data_dir);
    }
    Ok(config)
}

/// Write a commented starter config at `path`. Refuses to overwrite
/// unless `force` is set.
pub fn write_default_config(path: &Path, timezone: &str, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if parse_utc_offset(timezone).is_none() {
        return Err(ConfigError::InvalidTimezone(timezone.to_string()));
    }
    let text = CONFIG_TEMPLATE.replace("{timezone}", timezone);
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults_beside_it() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.data_dir, tmp.path().join("database"));
        assert_eq!(config.default_timezone, "+00:00");
        assert_eq!(config.min_age_years, 13);
    }

    #[test]
    fn template_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        write_default_config(&path, "+06:00", false).unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.default_timezone, "+06:00");
        assert_eq!(config.data_dir, tmp.path().join("database"));
    }

    #[test]
    fn refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        write_default_config(&path, "+00:00", false).unwrap();
        assert!(matches!(
            write_default_config(&path, "+00:00", false),
            Err(ConfigError::AlreadyExists(_))
        ));
        write_default_config(&path, "+01:00", true).unwrap();
        assert_eq!(read_config(&path).unwrap().default_timezone, "+01:00");
    }

    #[test]
    fn absolute_data_dir_is_kept() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        let data = tmp.path().join("elsewhere");
        fs::write(&path, format!("data_dir = {:?}\n", data.to_string_lossy())).unwrap();
        assert_eq!(read_config(&path).unwrap().data_dir, data);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "min_age_years = \"old\"").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn bad_timezone_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "default_timezone = \"Asia/Dhaka\"").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::InvalidTimezone(_))));
    }
}
