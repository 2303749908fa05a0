use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DROPTRACK_DIR";

/// Directory name used under the platform config and data roots.
const APP_DIR_NAME: &str = "droptrack";

/// Fallback data directory, relative to the working directory.
const LOCAL_DATA_DIR: &str = ".droptrack";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    /// Where item blobs are stored.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Preferred output mode: `pretty`, `text`, or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub user: UserConfig,
    pub data_dir: PathBuf,
}

/// Path of the user config file, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_config_file(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Parse a config file; a missing file yields defaults.
pub fn load_config_file(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(cli_data_dir: Option<&Path>) -> Result<EffectiveConfig> {
    let user = load_user_config()?;
    let env_dir = std::env::var(DATA_DIR_ENV).ok();
    let data_dir = resolve_data_dir(
        cli_data_dir,
        env_dir.as_deref(),
        &user,
        dirs::data_dir().as_deref(),
    );
    Ok(EffectiveConfig { user, data_dir })
}

/// Data directory precedence (highest wins):
/// 1. `--data-dir`
/// 2. `DROPTRACK_DIR`
/// 3. `data_dir` in the user config
/// 4. `<platform data dir>/droptrack`
/// 5. `./.droptrack`
#[must_use]
pub fn resolve_data_dir(
    cli_data_dir: Option<&Path>,
    env_dir: Option<&str>,
    user: &UserConfig,
    platform_data_dir: Option<&Path>,
) -> PathBuf {
    if let Some(dir) = cli_data_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = &user.data_dir {
        return dir.clone();
    }
    platform_data_dir.map_or_else(
        || PathBuf::from(LOCAL_DATA_DIR),
        |dir| dir.join(APP_DIR_NAME),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_file(&dir.path().join("config.toml")).expect("load should succeed");
        assert_eq!(cfg, UserConfig::default());
    }

    #[test]
    fn config_file_parses_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/drops\"\noutput = \"json\"\n").unwrap();

        let cfg = load_config_file(&path).unwrap();
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/srv/drops")));
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = [").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn flag_beats_env_beats_config() {
        let user = UserConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            output: None,
        };
        let platform = Path::new("/platform");

        let dir = resolve_data_dir(Some(Path::new("/flag")), Some("/env"), &user, Some(platform));
        assert_eq!(dir, PathBuf::from("/flag"));

        let dir = resolve_data_dir(None, Some("/env"), &user, Some(platform));
        assert_eq!(dir, PathBuf::from("/env"));

        let dir = resolve_data_dir(None, Some("  "), &user, Some(platform));
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn falls_back_to_platform_then_local() {
        let user = UserConfig::default();
        let dir = resolve_data_dir(None, None, &user, Some(Path::new("/platform")));
        assert_eq!(dir, PathBuf::from("/platform/droptrack"));

        let dir = resolve_data_dir(None, None, &user, None);
        assert_eq!(dir, PathBuf::from(".droptrack"));
    }
}
