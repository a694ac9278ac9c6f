pub mod hours;

use tracing::debug;

use crate::csv::Row;
use crate::i18n::Language;
use crate::state::Tab;
use hours::{DayHours, HoursRange};

/// The `type` discriminant of an info sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoRowKind {
    HoursLocation,
    HoursKitchen,
    MenuHeaderCuisine,
    MenuHeaderBar,
    Text,
    Cta,
    Ignored(String),
}

impl InfoRowKind {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "hours_location" => InfoRowKind::HoursLocation,
            "hours_kitchen" => InfoRowKind::HoursKitchen,
            "menu_header_cuisine" => InfoRowKind::MenuHeaderCuisine,
            "menu_header_bar" => InfoRowKind::MenuHeaderBar,
            "text" => InfoRowKind::Text,
            "cta" => InfoRowKind::Cta,
            other => InfoRowKind::Ignored(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Card,
    Plain,
}

impl BlockStyle {
    /// Blank picks `default`; anything other than `card` renders plain.
    fn from_field(raw: &str, default: BlockStyle) -> Self {
        match raw {
            "" => default,
            "card" => BlockStyle::Card,
            _ => BlockStyle::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtaStyle {
    Primary,
    Secondary,
}

impl CtaStyle {
    fn from_field(raw: &str) -> Self {
        if raw == "primary" {
            CtaStyle::Primary
        } else {
            CtaStyle::Secondary
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuHeader {
    pub title_it: String,
    pub title_en: String,
    pub text_it: String,
    pub text_en: String,
    pub style: BlockStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text {
        label_it: String,
        label_en: String,
        text_it: String,
        text_en: String,
        style: BlockStyle,
    },
    Cta {
        label_it: String,
        label_en: String,
        link: String,
        style: CtaStyle,
    },
}

impl ContentItem {
    pub fn label(&self, lang: Language) -> &str {
        match self {
            ContentItem::Text {
                label_it, label_en, ..
            }
            | ContentItem::Cta {
                label_it, label_en, ..
            } => lang.pick(label_it, label_en),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoData {
    pub hours_location: Vec<HoursRange>,
    pub hours_kitchen: Vec<HoursRange>,
    pub menu_header_cuisine: Option<MenuHeader>,
    pub menu_header_bar: Option<MenuHeader>,
    /// Texts and calls to action in sheet order.
    pub content: Vec<ContentItem>,
}

impl InfoData {
    pub fn menu_header(&self, tab: Tab) -> Option<&MenuHeader> {
        match tab {
            Tab::Cuisine => self.menu_header_cuisine.as_ref(),
            Tab::Bar => self.menu_header_bar.as_ref(),
            Tab::Info => None,
        }
    }
}

pub fn info_data(rows: &[Row]) -> InfoData {
    let mut location = Vec::new();
    let mut kitchen = Vec::new();
    let mut data = InfoData::default();

    for row in rows {
        match InfoRowKind::classify(row.get("type")) {
            InfoRowKind::HoursLocation => location.extend(DayHours::from_row(row)),
            InfoRowKind::HoursKitchen => kitchen.extend(DayHours::from_row(row)),
            // Singletons: a later row replaces an earlier one.
            InfoRowKind::MenuHeaderCuisine => data.menu_header_cuisine = Some(menu_header(row)),
            InfoRowKind::MenuHeaderBar => data.menu_header_bar = Some(menu_header(row)),
            InfoRowKind::Text => data.content.push(ContentItem::Text {
                label_it: row.get("label_it").to_string(),
                label_en: row.get("label_en").to_string(),
                text_it: row.get("text_it").to_string(),
                text_en: row.get("text_en").to_string(),
                style: BlockStyle::from_field(row.get("style"), BlockStyle::Plain),
            }),
            InfoRowKind::Cta => data.content.push(ContentItem::Cta {
                label_it: row.get("label_it").to_string(),
                label_en: row.get("label_en").to_string(),
                link: row.get("link").to_string(),
                style: CtaStyle::from_field(row.get("style")),
            }),
            InfoRowKind::Ignored(kind) => debug!(kind = %kind, "skipping info row"),
        }
    }

    data.hours_location = hours::collapse(location);
    data.hours_kitchen = hours::collapse(kitchen);
    data
}

fn menu_header(row: &Row) -> MenuHeader {
    MenuHeader {
        title_it: row.get("label_it").to_string(),
        title_en: row.get("label_en").to_string(),
        text_it: row.get("text_it").to_string(),
        text_en: row.get("text_en").to_string(),
        style: BlockStyle::from_field(row.get("style"), BlockStyle::Card),
    }
}
