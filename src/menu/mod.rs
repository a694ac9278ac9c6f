pub mod allergen;
pub mod filter;
pub mod normalize;

use std::collections::BTreeSet;

use tracing::debug;

use crate::i18n::Language;
use allergen::Allergen;

/// Diet classification from the sheet's `tipo` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Diet {
    #[default]
    Standard,
    Vegetarian,
    Vegan,
}

impl Diet {
    pub fn from_tipo(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "vegano" | "vegan" => Diet::Vegan,
            "vegetariano" | "vegetarian" => Diet::Vegetarian,
            "" | "standard" => Diet::Standard,
            other => {
                debug!(tipo = other, "unknown diet type, treating as standard");
                Diet::Standard
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub name_it: String,
    pub name_en: String,
    pub desc_it: String,
    pub desc_en: String,
    /// Normalized to two decimals with a comma separator, or the raw text.
    pub price: String,
    pub order: f64,
    pub allergens: BTreeSet<Allergen>,
    pub diet: Diet,
}

impl MenuItem {
    pub fn name(&self, lang: Language) -> &str {
        lang.pick(&self.name_it, &self.name_en)
    }

    pub fn description(&self, lang: Language) -> &str {
        lang.pick(&self.desc_it, &self.desc_en)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub order: f64,
    pub items: Vec<MenuItem>,
}

/// A normalized menu tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuData {
    pub categories: Vec<Category>,
    /// Last non-blank `ultimo_aggiornamento` in sheet order.
    pub last_sheet_update: Option<String>,
}
