//! Wishes configuration.
//!
//! Loaded from `~/.wishes/config.toml`. Every key is optional and a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Wishes configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// The acting user when neither `--as` nor `WISHES_IDENTITY` is set.
    pub identity: Option<String>,

    /// Directory holding `wishes.sqlite`. Defaults to `~/.wishes`.
    pub database: Option<PathBuf>,
}

impl Config {
    /// Load config from `~/.wishes/config.toml`.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`. A missing file yields the defaults;
    /// an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let mut config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;
        config.identity = config.identity.filter(|s| !s.trim().is_empty());
        Ok(config)
    }

    /// The config file path: `~/.wishes/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wishes").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "identity = \"alice\"\ndatabase = \"/tmp/wishes\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.identity.as_deref(), Some("alice"));
        assert_eq!(config.database, Some(PathBuf::from("/tmp/wishes")));
    }

    #[test]
    fn blank_identity_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "identity = \"  \"\n").unwrap();

        assert!(Config::load_from(&path).unwrap().identity.is_none());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "identity = \n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config"));
    }

    #[test]
    fn unknown_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default-identity = \"alice\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
