use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::menu::allergen::Allergen;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    It,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::It => "it",
            Language::En => "en",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Language::It => Language::En,
            Language::En => Language::It,
        }
    }

    /// Choose between the Italian and English variant of a field.
    pub fn pick<'a>(self, it: &'a str, en: &'a str) -> &'a str {
        match self {
            Language::It => it,
            Language::En => en,
        }
    }
}

/// Fixed UI strings for one language.
#[derive(Debug)]
pub struct Labels {
    pub diet_vegetarian: &'static str,
    pub diet_vegan: &'static str,
    pub loading: &'static str,
    pub empty: &'static str,
    pub error_message: &'static str,
    pub retry: &'static str,
    pub updated: &'static str,
    pub allergen_disclaimer: &'static str,
    pub allergens_excluded: &'static str,
    pub opening_hours: &'static str,
    pub kitchen_hours: &'static str,
    pub view_on_map: &'static str,
    pub back_to_menu: &'static str,
}

static IT: Labels = Labels {
    diet_vegetarian: "Vegetariano",
    diet_vegan: "Vegano",
    loading: "Caricamento menu...",
    empty: "Nessun piatto corrisponde ai filtri.",
    error_message: "Menu non disponibile.",
    retry: "Riprova",
    updated: "Menu aggiornato",
    allergen_disclaimer: "Chiedi al personale per ulteriori dettagli sugli allergeni.",
    allergens_excluded: "allergeni esclusi",
    opening_hours: "Orari Apertura",
    kitchen_hours: "Orari Cucina",
    view_on_map: "Vedi su Mappa",
    back_to_menu: "Torna al Menu",
};

static EN: Labels = Labels {
    diet_vegetarian: "Vegetarian",
    diet_vegan: "Vegan",
    loading: "Loading menu...",
    empty: "No dishes match your filters.",
    error_message: "Menu unavailable.",
    retry: "Retry",
    updated: "Menu updated",
    allergen_disclaimer: "Ask staff for allergen details.",
    allergens_excluded: "allergens excluded",
    opening_hours: "Opening Hours",
    kitchen_hours: "Kitchen Hours",
    view_on_map: "View on Map",
    back_to_menu: "Back to Menu",
};

pub fn labels(lang: Language) -> &'static Labels {
    match lang {
        Language::It => &IT,
        Language::En => &EN,
    }
}

pub fn allergen_name(allergen: Allergen, lang: Language) -> &'static str {
    use Allergen::*;
    let (it, en) = match allergen {
        Gluten => ("Glutine", "Gluten"),
        Crustaceans => ("Crostacei", "Shellfish"),
        Eggs => ("Uova", "Eggs"),
        Fish => ("Pesce", "Fish"),
        Peanuts => ("Arachidi", "Peanuts"),
        Soy => ("Soia", "Soy"),
        Milk => ("Latte", "Milk"),
        TreeNuts => ("Frutta a guscio", "Tree nuts"),
        Celery => ("Sedano", "Celery"),
        Mustard => ("Senape", "Mustard"),
        Sesame => ("Sesamo", "Sesame"),
        Sulphites => ("Solfiti", "Sulphites"),
        Lupin => ("Lupini", "Lupin"),
        Molluscs => ("Molluschi", "Molluscs"),
    };
    lang.pick(it, en)
}
