//! HTML fragments for the three tabs, rendered with tera (autoescaped).

use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use tera::{escape_html, Context, Tera};

use crate::i18n::{allergen_name, labels, Language};
use crate::info::hours::HoursRange;
use crate::info::{BlockStyle, ContentItem, CtaStyle, InfoData, MenuHeader};
use crate::menu::filter::{self, DietFilter, FilterState};
use crate::menu::normalize::{parse_leading_number, to_fixed};
use crate::menu::{Category, Diet, MenuItem};
use crate::site::{non_blank, Regional, SiteConfig};
use crate::state::{AppState, Tab};

const MENU_TEMPLATE: &str = r#"{% if header %}<div class="menu-header menu-header-{{ header.style }}">
{% if header.title %}  <h2 class="menu-header-title">{{ header.title }}</h2>
{% endif %}{% if header.text %}  <p class="menu-header-text">{{ header.text }}</p>
{% endif %}</div>
{% endif %}{% if active %}<div class="active-filters">
{% if active.diet %}  <span class="filter-chip diet-chip">{{ active.diet.icon }} {{ active.diet.label }}</span>
{% endif %}{% if active.excluded > 0 %}  <span class="filter-chip allergen-chip">{{ active.excluded }} {{ active.excluded_label }}</span>
{% endif %}</div>
{% endif %}{% for category in categories %}<section class="category-section">
  <h2 class="category-title">{{ category.name }}</h2>
  <div class="menu-items">
{% for item in category.items %}    <article class="menu-item">
      <div class="item-header">
        <h3 class="item-name">{{ item.name }}</h3>
{% if item.price %}        <span class="item-price">{{ item.price }}</span>
{% endif %}      </div>
{% if item.description %}      <p class="item-description">{{ item.description }}</p>
{% endif %}{% if item.diet or item.allergens %}      <div class="item-footer">
{% if item.diet %}        <span class="food-type-badge {{ item.diet.class }}"><span class="food-type-icon">{{ item.diet.icon }}</span> {{ item.diet.label }}</span>
{% endif %}{% if item.allergens %}        <div class="allergen-chips">
{% for chip in item.allergens %}          <span class="allergen-chip"><span class="allergen-icon">{{ chip.icon }}</span> {{ chip.name }}</span>
{% endfor %}        </div>
{% endif %}      </div>
{% endif %}    </article>
{% endfor %}  </div>
</section>
{% endfor %}<p class="allergen-disclaimer">{{ disclaimer }}</p>
"#;

const INFO_TEMPLATE: &str = r#"{% if location %}<section class="info-card location-card">
{% if location.address %}  <h3 class="location-address">{{ location.address }}</h3>
{% endif %}{% if location.phone %}  <a href="tel:{{ location.phone_link }}" class="contact-row"><span>📞</span> {{ location.phone }}</a>
{% endif %}{% if location.email %}  <a href="mailto:{{ location.email }}" class="contact-row"><span>✉️</span> {{ location.email }}</a>
{% endif %}{% if location.map_url %}  <a href="{{ location.map_url }}" target="_blank" class="map-embed">🗺️ {{ location.map_label }}</a>
{% endif %}</section>
{% endif %}{% for item in content %}{% if item.kind == "text" %}<section class="info-section info-section-{{ item.style }}">
{% if item.label %}  <h2 class="info-title">{{ item.label }}</h2>
{% endif %}  <p class="info-text">{{ item.text }}</p>
</section>
{% else %}<a href="{{ item.link }}" class="cta-btn {{ item.style }}">{{ item.label }}</a>
{% endif %}{% endfor %}{% if timetables %}<section class="info-card">
{% for table in timetables %}  <h3 class="info-title">{{ table.title }}</h3>
  <div class="timetable-grid">
{% for row in table.rows %}    <div class="time-row"><span class="time-days">{{ row.days }}</span> <span class="time-hours">{{ row.times }}</span></div>
{% endfor %}  </div>
{% endfor %}</section>
{% endif %}{% if socials %}<div class="social-grid">
{% for social in socials %}  <a href="{{ social.url }}" target="_blank" class="social-link"><span>{{ social.icon }}</span> {{ social.name }}</a>
{% endfor %}</div>
{% endif %}"#;

const BRAND_TEMPLATE: &str = r#"<header class="store-header"{% if accent %} style="--color-accent: {{ accent }}"{% endif %}>
{% if logo %}  <img class="store-logo" src="{{ logo }}" alt="">
{% endif %}{% if name %}  <h1 class="store-name">{{ name }}</h1>
{% endif %}</header>
"#;

const CONFIG_ERROR_TITLE: &str = "Configuration Error";

/// What the current tab shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    /// Menu loaded, but nothing survives the filters.
    Empty,
    Menu(String),
    Info(String),
}

pub fn screen(state: &AppState) -> Result<Screen> {
    let tab = state.current_tab();
    let lang = state.language();

    if tab == Tab::Info {
        return Ok(match state.info() {
            Some(info) => Screen::Info(info_fragment(info, state.site(), lang)?),
            None => Screen::Loading,
        });
    }

    let Some(menu) = state.menu(tab) else {
        return Ok(Screen::Loading);
    };
    let categories = filter::apply(&menu.categories, state.filters());
    if categories.is_empty() {
        return Ok(Screen::Empty);
    }
    let header = state.info().and_then(|info| info.menu_header(tab));
    Ok(Screen::Menu(menu_fragment(
        &categories,
        header,
        state.filters(),
        &state.site().regional,
        lang,
    )?))
}

/// Store name, logo and accent colour. Empty when the config sets none of
/// them.
pub fn branding(state: &AppState) -> Result<String> {
    let site = state.site();
    let name = if state.config_error() {
        Some(CONFIG_ERROR_TITLE)
    } else {
        site.app_name()
    };
    let (logo, accent) = (site.logo_url(), site.accent_color());
    if name.is_none() && logo.is_none() && accent.is_none() {
        return Ok(String::new());
    }

    let mut ctx = Context::new();
    ctx.insert("name", &name);
    ctx.insert("logo", &logo);
    ctx.insert("accent", &accent);
    Ok(Tera::one_off(BRAND_TEMPLATE, &ctx, true)?)
}

/// Branding, the current screen, then the last-updated line.
pub fn page(state: &AppState) -> Result<String> {
    let brand = branding(state)?;
    let l = labels(state.language());
    let body = match screen(state)? {
        Screen::Loading => format!("<p class=\"loading-state\">{}</p>\n", l.loading),
        Screen::Empty => format!("<p class=\"empty-state\">{}</p>\n", l.empty),
        Screen::Menu(html) | Screen::Info(html) => html,
    };
    Ok(format!(
        "{brand}{body}<p class=\"last-updated\">{}: {}</p>\n",
        l.updated,
        escape_html(&last_updated(state))
    ))
}

/// Shown when a tab could not be loaded from either source.
pub fn error_fragment(lang: Language) -> String {
    let l = labels(lang);
    format!(
        "<div class=\"error-state\">\n  <p>{}</p>\n  <p class=\"retry\">{}</p>\n</div>\n",
        l.error_message, l.retry
    )
}

/// Sheet stamp if the sheet has one, else the local fetch time.
pub fn last_updated(state: &AppState) -> String {
    let tab = state.current_tab();
    if let Some(stamp) = state.menu(tab).and_then(|m| m.last_sheet_update.as_deref()) {
        return stamp.to_string();
    }
    match state.fetched_at(tab) {
        Some(at) => at.with_timezone(&Local).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Currency display for a normalized price (`"12,50"`). Unparseable
/// prices are returned as written.
pub fn format_price(price: &str, regional: &Regional) -> String {
    if price.is_empty() {
        return String::new();
    }
    let Some(amount) = parse_leading_number(&price.replacen(',', ".", 1)) else {
        return price.to_string();
    };

    let fixed = to_fixed(amount, 2);
    let locale = non_blank(&regional.locale).unwrap_or("it-IT");
    let currency = non_blank(&regional.currency).unwrap_or("EUR");
    let symbol = match currency.to_uppercase().as_str() {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        "CHF" => "CHF",
        _ => {
            let symbol = non_blank(&regional.currency_symbol).unwrap_or("€");
            return format!("{symbol} {fixed}");
        }
    };

    let language = locale.split(['-', '_']).next().unwrap_or_default().to_lowercase();
    if matches!(language.as_str(), "it" | "de" | "fr" | "es" | "pt" | "nl") {
        format!("{} {symbol}", fixed.replace('.', ","))
    } else if symbol.chars().all(char::is_alphabetic) {
        format!("{symbol} {fixed}")
    } else {
        format!("{symbol}{fixed}")
    }
}

#[derive(Serialize)]
struct HeaderView<'a> {
    title: &'a str,
    text: &'a str,
    style: &'static str,
}

#[derive(Serialize)]
struct Badge {
    class: &'static str,
    icon: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct ActiveFilters {
    diet: Option<Badge>,
    excluded: usize,
    excluded_label: &'static str,
}

#[derive(Serialize)]
struct Chip {
    icon: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct ItemView<'a> {
    name: &'a str,
    description: &'a str,
    price: String,
    diet: Option<Badge>,
    allergens: Vec<Chip>,
}

#[derive(Serialize)]
struct CategoryView<'a> {
    name: &'a str,
    items: Vec<ItemView<'a>>,
}

fn block_style(style: BlockStyle) -> &'static str {
    match style {
        BlockStyle::Card => "card",
        BlockStyle::Plain => "plain",
    }
}

fn diet_badge(diet: Diet, lang: Language) -> Option<Badge> {
    let l = labels(lang);
    match diet {
        Diet::Standard => None,
        Diet::Vegetarian => Some(Badge {
            class: "vegetariano",
            icon: "🌿",
            label: l.diet_vegetarian,
        }),
        Diet::Vegan => Some(Badge {
            class: "vegano",
            icon: "🌱",
            label: l.diet_vegan,
        }),
    }
}

fn item_view<'a>(item: &'a MenuItem, regional: &Regional, lang: Language) -> ItemView<'a> {
    ItemView {
        name: item.name(lang),
        description: item.description(lang),
        price: format_price(&item.price, regional),
        diet: diet_badge(item.diet, lang),
        allergens: item
            .allergens
            .iter()
            .map(|&a| Chip {
                icon: a.icon(),
                name: allergen_name(a, lang),
            })
            .collect(),
    }
}

fn active_filters(filters: &FilterState, lang: Language) -> Option<ActiveFilters> {
    if !filters.is_active() {
        return None;
    }
    let diet = match filters.diet {
        DietFilter::All => None,
        DietFilter::Vegetarian => diet_badge(Diet::Vegetarian, lang),
        DietFilter::Vegan => diet_badge(Diet::Vegan, lang),
    };
    Some(ActiveFilters {
        diet,
        excluded: filters.excluded.len(),
        excluded_label: labels(lang).allergens_excluded,
    })
}

/// Render already-filtered categories.
pub fn menu_fragment(
    categories: &[Category],
    header: Option<&MenuHeader>,
    filters: &FilterState,
    regional: &Regional,
    lang: Language,
) -> Result<String> {
    let header = header
        .map(|h| HeaderView {
            title: lang.pick(&h.title_it, &h.title_en),
            text: lang.pick(&h.text_it, &h.text_en),
            style: block_style(h.style),
        })
        .filter(|h| !h.title.is_empty() || !h.text.is_empty());

    let categories: Vec<CategoryView> = categories
        .iter()
        .map(|c| CategoryView {
            name: &c.name,
            items: c.items.iter().map(|i| item_view(i, regional, lang)).collect(),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("header", &header);
    ctx.insert("active", &active_filters(filters, lang));
    ctx.insert("categories", &categories);
    ctx.insert("disclaimer", labels(lang).allergen_disclaimer);
    Ok(Tera::one_off(MENU_TEMPLATE, &ctx, true)?)
}

#[derive(Serialize)]
struct LocationView<'a> {
    address: Option<&'a str>,
    phone: Option<&'a str>,
    phone_link: String,
    email: Option<&'a str>,
    map_url: Option<&'a str>,
    map_label: &'static str,
}

#[derive(Serialize)]
struct ContentView<'a> {
    kind: &'static str,
    label: &'a str,
    text: &'a str,
    link: &'a str,
    style: &'static str,
}

#[derive(Serialize)]
struct HoursRow<'a> {
    days: &'a str,
    times: String,
}

#[derive(Serialize)]
struct Timetable<'a> {
    title: &'static str,
    rows: Vec<HoursRow<'a>>,
}

#[derive(Serialize)]
struct SocialView<'a> {
    name: &'a str,
    url: &'a str,
    icon: &'a str,
}

fn content_view(item: &ContentItem, lang: Language) -> ContentView<'_> {
    match item {
        ContentItem::Text {
            text_it,
            text_en,
            style,
            ..
        } => ContentView {
            kind: "text",
            label: item.label(lang),
            text: lang.pick(text_it, text_en),
            link: "",
            style: block_style(*style),
        },
        ContentItem::Cta { link, style, .. } => ContentView {
            kind: "cta",
            label: item.label(lang),
            text: "",
            link,
            style: match style {
                CtaStyle::Primary => "primary",
                CtaStyle::Secondary => "secondary",
            },
        },
    }
}

fn timetable<'a>(title: &'static str, ranges: &'a [HoursRange], lang: Language) -> Option<Timetable<'a>> {
    (!ranges.is_empty()).then(|| Timetable {
        title,
        rows: ranges
            .iter()
            .map(|r| HoursRow {
                days: r.days(lang),
                times: r.times(),
            })
            .collect(),
    })
}

pub fn info_fragment(info: &InfoData, site: &SiteConfig, lang: Language) -> Result<String> {
    let l = labels(lang);
    let phone = non_blank(&site.contact.phone);
    let location = LocationView {
        address: non_blank(&site.location.address),
        phone,
        phone_link: phone
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect())
            .unwrap_or_default(),
        email: non_blank(&site.contact.email),
        map_url: non_blank(&site.location.map_url),
        map_label: l.view_on_map,
    };
    let has_location = location.address.is_some()
        || location.phone.is_some()
        || location.email.is_some()
        || location.map_url.is_some();

    let content: Vec<ContentView> = info.content.iter().map(|c| content_view(c, lang)).collect();
    let timetables: Vec<Timetable> = [
        timetable(l.opening_hours, &info.hours_location, lang),
        timetable(l.kitchen_hours, &info.hours_kitchen, lang),
    ]
    .into_iter()
    .flatten()
    .collect();
    let socials: Vec<SocialView> = site
        .contact
        .socials
        .iter()
        .map(|s| SocialView {
            name: &s.name,
            url: &s.url,
            icon: non_blank(&s.icon).unwrap_or("🔗"),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("location", &has_location.then_some(location));
    ctx.insert("content", &content);
    ctx.insert("timetables", &timetables);
    ctx.insert("socials", &socials);
    Ok(Tera::one_off(INFO_TEMPLATE, &ctx, true)?)
}
