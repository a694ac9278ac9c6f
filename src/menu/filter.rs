use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::allergen::Allergen;
use super::{Category, Diet, MenuItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DietFilter {
    #[default]
    All,
    Vegetarian,
    Vegan,
}

impl DietFilter {
    /// Vegan dishes satisfy the vegetarian filter too.
    pub fn admits(self, diet: Diet) -> bool {
        match self {
            DietFilter::All => true,
            DietFilter::Vegetarian => matches!(diet, Diet::Vegetarian | Diet::Vegan),
            DietFilter::Vegan => diet == Diet::Vegan,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub diet: DietFilter,
    pub excluded: BTreeSet<Allergen>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        self.diet != DietFilter::All || !self.excluded.is_empty()
    }

    pub fn admits(&self, item: &MenuItem) -> bool {
        self.diet.admits(item.diet) && item.allergens.is_disjoint(&self.excluded)
    }
}

/// Project `categories` through `filters`, dropping categories left empty.
/// Inputs are never touched; every call builds a fresh structure.
pub fn apply(categories: &[Category], filters: &FilterState) -> Vec<Category> {
    categories
        .iter()
        .filter_map(|category| {
            let items: Vec<MenuItem> = category
                .items
                .iter()
                .filter(|item| filters.admits(item))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| Category {
                name: category.name.clone(),
                order: category.order,
                items,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;
    use crate::menu::normalize::menu_data;

    fn fixture() -> Vec<Category> {
        let text = std::fs::read_to_string("tests/fixtures/cuisine.csv").unwrap();
        menu_data(&csv::parse(&text)).categories
    }

    fn names(categories: &[Category]) -> BTreeSet<String> {
        categories
            .iter()
            .flat_map(|c| &c.items)
            .map(|i| i.name_it.clone())
            .collect()
    }

    fn filters(diet: DietFilter, excluded: &[Allergen]) -> FilterState {
        FilterState {
            diet,
            excluded: excluded.iter().copied().collect(),
        }
    }

    #[test]
    fn all_keeps_everything() {
        let categories = fixture();
        let out = apply(&categories, &FilterState::default());
        assert_eq!(out, categories);
    }

    #[test]
    fn vegan_is_subset_of_vegetarian() {
        let categories = fixture();
        let vegetarian = names(&apply(&categories, &filters(DietFilter::Vegetarian, &[])));
        let vegan = names(&apply(&categories, &filters(DietFilter::Vegan, &[])));
        assert!(!vegan.is_empty());
        assert!(vegan.is_subset(&vegetarian));
        assert!(vegan.len() < vegetarian.len());
    }

    #[test]
    fn idempotent() {
        let categories = fixture();
        let state = filters(DietFilter::Vegetarian, &[Allergen::Milk]);
        let once = apply(&categories, &state);
        let twice = apply(&once, &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn excluded_allergens_are_hidden() {
        let categories = fixture();
        let out = apply(&categories, &filters(DietFilter::All, &[Allergen::Gluten]));
        assert!(out
            .iter()
            .flat_map(|c| &c.items)
            .all(|i| !i.allergens.contains(&Allergen::Gluten)));
    }

    #[test]
    fn empty_categories_are_dropped_not_mutated() {
        let categories = fixture();
        let before = categories.clone();
        let out = apply(&categories, &filters(DietFilter::Vegan, &Allergen::ALL));
        assert!(out.iter().all(|c| !c.items.is_empty()));
        assert!(out.len() < categories.len());
        assert_eq!(categories, before);
    }

    #[test]
    fn diet_admission_table() {
        use Diet::*;
        assert!(DietFilter::All.admits(Standard));
        assert!(!DietFilter::Vegetarian.admits(Standard));
        assert!(DietFilter::Vegetarian.admits(Vegetarian));
        assert!(DietFilter::Vegetarian.admits(Vegan));
        assert!(!DietFilter::Vegan.admits(Vegetarian));
        assert!(DietFilter::Vegan.admits(Vegan));
    }
}
