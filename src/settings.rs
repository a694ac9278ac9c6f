use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Process settings. Every relative path is resolved against `root_dir`.
///
/// Sources, later wins: built-in defaults, an optional `sheet_menu.toml`
/// in the working directory, then `SHEET_MENU_*` environment variables
/// (`SHEET_MENU_DATA_DIR=/srv/menu`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub root_dir: PathBuf,
    pub content_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub config_path: PathBuf,
    /// Holds the `<tab>.csv` fallback copies.
    pub data_dir: PathBuf,
    pub prefs_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            root_dir: PathBuf::from("."),
            content_dir: PathBuf::from("content"),
            pages_dir: PathBuf::from("pages"),
            config_path: PathBuf::from("config/config.json"),
            data_dir: PathBuf::from("."),
            prefs_path: PathBuf::from(".menu-preferences.json"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name("sheet_menu").required(false))
            .add_source(Environment::with_prefix("SHEET_MENU"))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn with_root(self, root: Option<PathBuf>) -> Self {
        match root {
            Some(root_dir) => Settings { root_dir, ..self },
            None => self,
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root_dir.join(path)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.resolve(&self.content_dir)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.resolve(&self.pages_dir)
    }

    pub fn config_path(&self) -> PathBuf {
        self.resolve(&self.config_path)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.resolve(&self.prefs_path)
    }

    pub fn robots_path(&self) -> PathBuf {
        self.root_dir.join("robots.txt")
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.root_dir.join("sitemap.xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_under_root() {
        let settings = Settings::default().with_root(Some(PathBuf::from("/srv/site")));
        assert_eq!(settings.config_path(), PathBuf::from("/srv/site/config/config.json"));
        assert_eq!(settings.pages_dir(), PathBuf::from("/srv/site/pages"));
        assert_eq!(settings.sitemap_path(), PathBuf::from("/srv/site/sitemap.xml"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let settings = Settings {
            data_dir: PathBuf::from("/var/menu"),
            ..Settings::default()
        };
        assert_eq!(settings.data_dir(), PathBuf::from("/var/menu"));
    }

    #[test]
    fn missing_root_keeps_default() {
        let settings = Settings::default().with_root(None);
        assert_eq!(settings.root_dir, PathBuf::from("."));
    }
}
