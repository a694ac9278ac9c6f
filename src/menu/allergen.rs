use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The 14 regulated allergens. Declaration order is id order.
///
/// Serialized by CSV column name (`all_1_glutine`) so stored preferences
/// stay readable by the sheet template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Allergen {
    #[serde(rename = "all_1_glutine")]
    Gluten,
    #[serde(rename = "all_2_crostacei")]
    Crustaceans,
    #[serde(rename = "all_3_uova")]
    Eggs,
    #[serde(rename = "all_4_pesce")]
    Fish,
    #[serde(rename = "all_5_arachidi")]
    Peanuts,
    #[serde(rename = "all_6_soia")]
    Soy,
    #[serde(rename = "all_7_latte")]
    Milk,
    #[serde(rename = "all_8_frutta_a_guscio")]
    TreeNuts,
    #[serde(rename = "all_9_sedano")]
    Celery,
    #[serde(rename = "all_10_senape")]
    Mustard,
    #[serde(rename = "all_11_sesamo")]
    Sesame,
    #[serde(rename = "all_12_solfiti")]
    Sulphites,
    #[serde(rename = "all_13_lupini")]
    Lupin,
    #[serde(rename = "all_14_molluschi")]
    Molluscs,
}

impl Allergen {
    pub const ALL: [Allergen; 14] = [
        Allergen::Gluten,
        Allergen::Crustaceans,
        Allergen::Eggs,
        Allergen::Fish,
        Allergen::Peanuts,
        Allergen::Soy,
        Allergen::Milk,
        Allergen::TreeNuts,
        Allergen::Celery,
        Allergen::Mustard,
        Allergen::Sesame,
        Allergen::Sulphites,
        Allergen::Lupin,
        Allergen::Molluscs,
    ];

    /// Stable numeric id, 1 to 14.
    pub fn id(self) -> u8 {
        self as u8 + 1
    }

    pub fn key(self) -> &'static str {
        match self {
            Allergen::Gluten => "glutine",
            Allergen::Crustaceans => "crostacei",
            Allergen::Eggs => "uova",
            Allergen::Fish => "pesce",
            Allergen::Peanuts => "arachidi",
            Allergen::Soy => "soia",
            Allergen::Milk => "latte",
            Allergen::TreeNuts => "frutta_a_guscio",
            Allergen::Celery => "sedano",
            Allergen::Mustard => "senape",
            Allergen::Sesame => "sesamo",
            Allergen::Sulphites => "solfiti",
            Allergen::Lupin => "lupini",
            Allergen::Molluscs => "molluschi",
        }
    }

    /// Boolean flag column in the menu sheet.
    pub fn column(self) -> String {
        format!("all_{}_{}", self.id(), self.key())
    }

    pub fn icon(self) -> &'static str {
        match self {
            Allergen::Gluten => "🌾",
            Allergen::Crustaceans => "🦐",
            Allergen::Eggs => "🥚",
            Allergen::Fish => "🐟",
            Allergen::Peanuts => "🥜",
            Allergen::Soy => "🫘",
            Allergen::Milk => "🥛",
            Allergen::TreeNuts => "🌰",
            Allergen::Celery => "🥬",
            Allergen::Mustard => "🟡",
            Allergen::Sesame => "🫛",
            Allergen::Sulphites => "🍷",
            Allergen::Lupin => "🌸",
            Allergen::Molluscs => "🐚",
        }
    }

    /// Accepts the key (`glutine`), the column (`all_1_glutine`) or the id (`1`).
    pub fn lookup(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        if let Ok(id) = raw.parse::<u8>() {
            return Self::ALL.into_iter().find(|a| a.id() == id);
        }
        Self::ALL
            .into_iter()
            .find(|a| a.key() == raw || a.column() == raw)
    }
}

impl fmt::Display for Allergen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Allergen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("unknown allergen: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_declaration_order() {
        let ids: Vec<u8> = Allergen::ALL.iter().map(|a| a.id()).collect();
        assert_eq!(ids, (1..=14).collect::<Vec<_>>());
    }

    #[test]
    fn columns_match_sheet_headers() {
        assert_eq!(Allergen::Gluten.column(), "all_1_glutine");
        assert_eq!(Allergen::TreeNuts.column(), "all_8_frutta_a_guscio");
        assert_eq!(Allergen::Molluscs.column(), "all_14_molluschi");
    }

    #[test]
    fn lookup_accepts_key_column_and_id() {
        assert_eq!(Allergen::lookup("arachidi"), Some(Allergen::Peanuts));
        assert_eq!(Allergen::lookup("ALL_5_ARACHIDI"), Some(Allergen::Peanuts));
        assert_eq!(Allergen::lookup("5"), Some(Allergen::Peanuts));
        assert_eq!(Allergen::lookup("15"), None);
        assert_eq!(Allergen::lookup("peanut butter"), None);
    }

    #[test]
    fn serde_uses_column_names() {
        let json = serde_json::to_string(&Allergen::Milk).unwrap();
        assert_eq!(json, "\"all_7_latte\"");
        let back: Allergen = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Allergen::Milk);
    }
}
