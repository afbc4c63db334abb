use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

pub const SETTINGS_FILE: &str = ".gocd-tasks.toml";

/// A GoCD server release, compared on major then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    major: u32,
    minor: u32,
}

impl ServerVersion {
    /// First release whose artifacts carry an explicit `type` and may live in
    /// a plugin store.
    pub const ARTIFACT_TYPES: Self = Self::new(18, 3);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn supports_artifact_types(self) -> bool {
        self >= Self::ARTIFACT_TYPES
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    /// Accepts `MAJOR.MINOR` with any trailing components (`18.3.0`,
    /// `20.1.0-11093`) ignored.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || Error::InvalidServerVersion(s.to_owned());
        let mut parts = s.trim().splitn(3, '.');
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let minor = parts
            .next()
            .map(|p| p.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(p))
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_version: "18.2".to_owned(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Loads the nearest settings file, or the defaults when there is none.
    pub fn load() -> Result<Self> {
        match find_settings_file() {
            Some(path) => {
                debug!(path = %path.display(), "loading settings");
                Self::from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// The target server version: `flag` when given, otherwise the file's.
    pub fn server_version(&self, flag: Option<&str>) -> Result<ServerVersion> {
        let raw = flag.unwrap_or(&self.server_version);
        Ok(raw.parse()?)
    }
}

/// Finds the settings file by walking up from the current directory.
/// Returns `None` if no settings file is found.
pub fn find_settings_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    find_settings_file_from(&current_dir)
}

fn find_settings_file_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start;

    loop {
        let settings_path = dir.join(SETTINGS_FILE);
        if settings_path.is_file() {
            return Some(settings_path);
        }

        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case::major_minor("18.3", ServerVersion::new(18, 3))]
    #[case::with_patch("18.2.0", ServerVersion::new(18, 2))]
    #[case::with_build("20.1.0-11093", ServerVersion::new(20, 1))]
    #[case::minor_suffix("21.4-beta", ServerVersion::new(21, 4))]
    #[case::padded(" 19.0 ", ServerVersion::new(19, 0))]
    fn parses_versions(#[case] input: &str, #[case] expected: ServerVersion) {
        assert_eq!(input.parse::<ServerVersion>().unwrap(), expected);
    }

    #[rstest]
    #[case::major_only("18")]
    #[case::empty("")]
    #[case::words("latest")]
    #[case::missing_minor("18.")]
    fn rejects_malformed_versions(#[case] input: &str) {
        assert!(matches!(
            input.parse::<ServerVersion>(),
            Err(Error::InvalidServerVersion(_))
        ));
    }

    #[rstest]
    #[case::old("17.12", false)]
    #[case::just_before("18.2", false)]
    #[case::boundary("18.3", true)]
    #[case::later_minor("18.10", true)]
    #[case::later_major("19.0", true)]
    fn artifact_types_start_at_18_3(#[case] version: &str, #[case] expected: bool) {
        let version: ServerVersion = version.parse().unwrap();
        assert_eq!(version.supports_artifact_types(), expected);
    }

    #[rstest]
    fn default_targets_legacy_servers() {
        let version = Settings::default().server_version(None).unwrap();
        assert!(!version.supports_artifact_types());
    }

    #[rstest]
    fn flag_overrides_file_value() {
        let settings = Settings {
            server_version: "18.2".to_owned(),
        };
        assert_eq!(
            settings.server_version(Some("19.1")).unwrap(),
            ServerVersion::new(19, 1)
        );
    }

    #[rstest]
    fn reads_settings_file_and_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);

        std::fs::write(&path, "server_version = \"20.1\"\n").unwrap();
        assert_eq!(Settings::from_path(&path).unwrap().server_version, "20.1");

        std::fs::write(&path, "").unwrap();
        assert_eq!(Settings::from_path(&path).unwrap(), Settings::default());
    }

    #[rstest]
    fn finds_settings_file_in_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("pipelines").join("build");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "").unwrap();

        assert_eq!(
            find_settings_file_from(&nested),
            Some(dir.path().join(SETTINGS_FILE))
        );
    }
}
