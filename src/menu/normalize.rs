use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::allergen::Allergen;
use super::{Category, Diet, MenuData, MenuItem};
use crate::csv::Row;

/// Sort key for rows without a usable order. Pushes them last.
pub const SENTINEL_ORDER: f64 = 999.0;

const DEFAULT_CATEGORY: &str = "Altro";
const TRUTHY: &[&str] = &["true", "1", "x", "si", "sì", "yes"];

static NUMERIC_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

pub fn is_truthy(raw: &str) -> bool {
    let value = raw.trim().to_lowercase();
    TRUTHY.contains(&value.as_str())
}

/// Parse the longest numeric prefix, ignoring leading whitespace
/// (`"12.5 euro"` is 12.5).
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    NUMERIC_PREFIX_RE
        .find(raw.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Zero counts as unset, like a blank cell.
pub fn sort_order(raw: &str) -> f64 {
    parse_leading_number(raw)
        .filter(|n| *n != 0.0 && n.is_finite())
        .unwrap_or(SENTINEL_ORDER)
}

/// `n` with `places` decimals, rounding half away from zero on the exact
/// binary value: `2.125` gives `"2.13"` but `1.005` (stored as
/// 1.00499...) gives `"1.00"`.
pub fn to_fixed(n: f64, places: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    // Wide enough for the full expansion of any f64.
    let exact = format!("{:.1100}", n.abs());
    let (int, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits: Vec<char> = int.chars().chain(frac.chars().take(places)).collect();

    if frac.chars().nth(places).is_some_and(|d| d >= '5') {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == '9' {
                *d = '0';
            } else {
                *d = char::from(*d as u8 + 1);
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, '1');
        }
    }

    let split = digits.len() - places;
    let mut out = String::with_capacity(digits.len() + 2);
    if n < 0.0 {
        out.push('-');
    }
    out.extend(&digits[..split]);
    if places > 0 {
        out.push('.');
        out.extend(&digits[split..]);
    }
    out
}

/// `"8"` → `"8,00"`, `"12.5"` → `"12,50"`. Text that does not start with a
/// number is kept as written (after the comma substitution).
pub fn normalize_price(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let dotted = raw.replacen(',', ".", 1);
    match parse_leading_number(&dotted) {
        Some(n) => to_fixed(n, 2).replace('.', ","),
        None => dotted,
    }
}

pub fn allergens(row: &Row) -> impl Iterator<Item = Allergen> + '_ {
    Allergen::ALL
        .into_iter()
        .filter(|a| is_truthy(row.get(&a.column())))
}

/// Group active rows into sorted categories.
pub fn menu_data(rows: &[Row]) -> MenuData {
    let last_sheet_update = rows
        .iter()
        .filter_map(|r| r.non_blank("ultimo_aggiornamento"))
        .last()
        .map(str::to_string);

    let mut categories: Vec<Category> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for row in rows.iter().filter(|r| is_truthy(r.get("attivo"))) {
        let name = match row.get("categoria") {
            "" => DEFAULT_CATEGORY,
            name => name,
        };
        let slot = *by_name.entry(name.to_string()).or_insert_with(|| {
            categories.push(Category {
                name: name.to_string(),
                order: sort_order(row.get("ordine_categoria")),
                items: Vec::new(),
            });
            categories.len() - 1
        });
        categories[slot].items.push(menu_item(row));
    }

    for category in &mut categories {
        category.items.sort_by(|a, b| a.order.total_cmp(&b.order));
    }
    categories.sort_by(|a, b| a.order.total_cmp(&b.order));

    MenuData {
        categories,
        last_sheet_update,
    }
}

fn menu_item(row: &Row) -> MenuItem {
    let name_it = row.get("nome_it").to_string();
    let desc_it = row.get("descrizione_it").to_string();
    // Italian is canonical: English falls back to it, never the reverse.
    let name_en = or_fallback(row.get("nome_en"), &name_it);
    let desc_en = or_fallback(row.get("descrizione_en"), &desc_it);

    MenuItem {
        name_it,
        name_en,
        desc_it,
        desc_en,
        price: normalize_price(row.get("prezzo")),
        order: sort_order(row.get("ordine_prodotto")),
        allergens: allergens(row).collect(),
        diet: Diet::from_tipo(row.get("tipo")),
    }
}

fn or_fallback(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;

    const HEADER: &str = "attivo,categoria,ordine_categoria,ordine_prodotto,nome_it,nome_en,descrizione_it,descrizione_en,prezzo,tipo,ultimo_aggiornamento,all_1_glutine,all_7_latte";

    fn rows(body: &str) -> Vec<Row> {
        csv::parse(&format!("{}\n{}", HEADER, body))
    }

    #[test]
    fn truthy_spellings() {
        for v in ["true", "TRUE", "1", "x", "X", "si", "SI", "sì", "Sì", "yes", " yes "] {
            assert!(is_truthy(v), "{v:?} should be truthy");
        }
        for v in ["", "0", "no", "false", "n", "y"] {
            assert!(!is_truthy(v), "{v:?} should be falsy");
        }
    }

    #[test]
    fn allergen_flags() {
        let data = menu_data(&rows(
            "x,Primi,1,1,A,,,,8,,,X,\n\
             x,Primi,1,2,B,,,,8,,,SI,1\n\
             x,Primi,1,3,C,,,,8,,,,\n\
             x,Primi,1,4,D,,,,8,,,x,no",
        ));
        let items = &data.categories[0].items;
        assert_eq!(items[0].allergens.iter().copied().collect::<Vec<_>>(), vec![Allergen::Gluten]);
        assert_eq!(
            items[1].allergens.iter().copied().collect::<Vec<_>>(),
            vec![Allergen::Gluten, Allergen::Milk]
        );
        assert!(items[2].allergens.is_empty());
        assert!(!items[3].allergens.contains(&Allergen::Milk));
        // Columns missing from the sheet never produce allergens.
        assert!(items.iter().all(|i| !i.allergens.contains(&Allergen::Fish)));
    }

    #[test]
    fn english_falls_back_to_italian() {
        let data = menu_data(&rows("x,Primi,1,1,Lasagne al forno,,Ragù e besciamella,,12,,,,"));
        let item = &data.categories[0].items[0];
        assert_eq!(item.name_en, "Lasagne al forno");
        assert_eq!(item.desc_en, "Ragù e besciamella");
    }

    #[test]
    fn italian_never_falls_back_to_english() {
        let data = menu_data(&rows("x,Primi,1,1,,Lasagna,,Baked,12,,,,"));
        let item = &data.categories[0].items[0];
        assert_eq!(item.name_it, "");
        assert_eq!(item.name_en, "Lasagna");
    }

    #[test]
    fn inactive_rows_are_skipped_but_still_stamp() {
        let data = menu_data(&rows(
            "x,Primi,1,1,A,,,,8,,2024-01-01,,\n\
             ,Primi,1,2,B,,,,8,,2024-03-01,,\n\
             x,Primi,1,3,C,,,,8,,,,",
        ));
        assert_eq!(data.categories[0].items.len(), 2);
        assert_eq!(data.last_sheet_update.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn last_stamp_wins_not_max() {
        let data = menu_data(&rows(
            "x,Primi,1,1,A,,,,8,,2025-06-01,,\n\
             x,Primi,1,2,B,,,,8,,2024-01-01,,",
        ));
        assert_eq!(data.last_sheet_update.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn missing_stamp_stays_unset() {
        let data = menu_data(&rows("x,Primi,1,1,A,,,,8,,,,"));
        assert_eq!(data.last_sheet_update, None);
    }

    #[test]
    fn categories_and_items_are_ordered() {
        let data = menu_data(&rows(
            "x,Dolci,3,2,Tiramisù,,,,6,,,,\n\
             x,Primi,1,,Carbonara,,,,11,,,,\n\
             x,Primi,1,1,Amatriciana,,,,10,,,,\n\
             x,,,1,Acqua,,,,2,,,,\n\
             x,Dolci,3,1,Panna cotta,,,,5,,,,",
        ));
        let names: Vec<&str> = data.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Primi", "Dolci", "Altro"]);
        assert_eq!(data.categories[2].order, SENTINEL_ORDER);

        let primi: Vec<&str> = data.categories[0].items.iter().map(|i| i.name_it.as_str()).collect();
        assert_eq!(primi, vec!["Amatriciana", "Carbonara"]);
        let dolci: Vec<&str> = data.categories[1].items.iter().map(|i| i.name_it.as_str()).collect();
        assert_eq!(dolci, vec!["Panna cotta", "Tiramisù"]);
    }

    #[test]
    fn sort_order_sentinel() {
        assert_eq!(sort_order("3"), 3.0);
        assert_eq!(sort_order("2.5"), 2.5);
        assert_eq!(sort_order("abc"), SENTINEL_ORDER);
        assert_eq!(sort_order(""), SENTINEL_ORDER);
        assert_eq!(sort_order("0"), SENTINEL_ORDER);
    }

    #[test]
    fn price_normalization() {
        assert_eq!(normalize_price("8"), "8,00");
        assert_eq!(normalize_price("12.5"), "12,50");
        assert_eq!(normalize_price("12,5"), "12,50");
        assert_eq!(normalize_price("4,5 al bicchiere"), "4,50");
        assert_eq!(normalize_price("S.Q."), "S.Q.");
        assert_eq!(normalize_price("a, b"), "a. b");
        assert_eq!(normalize_price(""), "");
    }

    #[test]
    fn price_halves_round_up() {
        assert_eq!(normalize_price("2,125"), "2,13");
        assert_eq!(normalize_price("0.125"), "0,13");
        assert_eq!(normalize_price("9,999"), "10,00");
        // 1.005 is stored just below the half.
        assert_eq!(normalize_price("1.005"), "1,00");
    }

    #[test]
    fn fixed_decimals() {
        assert_eq!(to_fixed(99.999, 2), "100.00");
        assert_eq!(to_fixed(-2.125, 2), "-2.13");
        assert_eq!(to_fixed(0.0, 2), "0.00");
        assert_eq!(to_fixed(7.5, 0), "8");
        assert_eq!(to_fixed(12.0, 1), "12.0");
    }

    #[test]
    fn diet_from_tipo() {
        assert_eq!(Diet::from_tipo("Vegano"), Diet::Vegan);
        assert_eq!(Diet::from_tipo("vegan"), Diet::Vegan);
        assert_eq!(Diet::from_tipo(" VEGETARIANO "), Diet::Vegetarian);
        assert_eq!(Diet::from_tipo(""), Diet::Standard);
        assert_eq!(Diet::from_tipo("pescetariano"), Diet::Standard);
    }

    #[test]
    fn fixture_menu() {
        let text = std::fs::read_to_string("tests/fixtures/cuisine.csv").unwrap();
        let data = menu_data(&csv::parse(&text));
        assert!(!data.categories.is_empty());
        assert_eq!(data.last_sheet_update.as_deref(), Some("12/03/2025 18:40"));
        assert!(data
            .categories
            .iter()
            .flat_map(|c| &c.items)
            .all(|i| !i.name_en.is_empty()));
    }
}
