use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::i18n::Language;
use crate::menu::allergen::Allergen;
use crate::menu::filter::DietFilter;

/// The persisted viewer choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub language: Option<Language>,
    pub diet: Option<DietFilter>,
    pub exclude_allergens: Vec<Allergen>,
}

/// JSON file holding one [`Preferences`] record.
///
/// Storage problems never fail the caller: a missing or unreadable file
/// means "no saved preferences" and a failed write is only logged.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferenceStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<Preferences> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved preferences");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read preferences");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(prefs) => Some(prefs),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not parse preferences");
                None
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) {
        if let Err(e) = self.try_save(prefs) {
            warn!(error = %e, "could not save preferences");
        }
    }

    fn try_save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}
