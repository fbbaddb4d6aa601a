use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings loaded from `~/.config/dirmerge/config.toml`
///
/// ```toml
/// marker_suffix = ".dirmerge-delete"
///
/// [profiles.notes]
/// a = "/home/me/notes"
/// b = "/mnt/usb/notes"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub marker_suffix: Option<String>,
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub a: Option<PathBuf>,
    pub b: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub marker_suffix: Option<String>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("dirmerge").join("config.toml"))
            .ok_or_else(|| SyncError::Config("Cannot determine config directory".to_string()))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Ok(p) => p,
                Err(_) => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!("Loaded config from {}", path.display());
                Self::parse(&contents)
                    .map_err(|e| SyncError::Config(format!("{}: {}", path.display(), e)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SyncError::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_profiles() {
        let config = Config::parse(
            r#"
            marker_suffix = ".gone"

            [profiles.notes]
            a = "/home/me/notes"
            b = "/mnt/usb/notes"
            dry_run = true
            "#,
        )
        .unwrap();

        assert_eq!(config.marker_suffix.as_deref(), Some(".gone"));
        assert_eq!(config.list_profiles(), vec!["notes"]);
        let profile = config.get_profile("notes").unwrap();
        assert_eq!(profile.a.as_deref(), Some(Path::new("/home/me/notes")));
        assert_eq!(profile.dry_run, Some(true));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let err = Config::parse("colour = true").unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("absent.toml"))).unwrap();
        assert!(config.profiles.is_empty());
        assert!(config.marker_suffix.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "dry_run = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.dry_run, Some(true));
    }
}
