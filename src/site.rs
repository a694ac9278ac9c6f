//! The site's JSON config document: branding, locale, contacts, data
//! sources, SEO and legal fields. Every field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::i18n::Language;

pub const DEFAULT_BASE_URL: &str = "https://example.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub app: AppInfo,
    pub regional: Regional,
    pub location: Location,
    pub contact: Contact,
    pub urls: SourceUrls,
    pub seo: Seo,
    pub legal: Legal,
    pub pages: Pages,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppInfo {
    pub name: Option<String>,
    pub accent_color: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Regional {
    pub locale: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub address: Option<String>,
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub socials: Vec<Social>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Social {
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
}

/// Published CSV URL per tab.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceUrls {
    pub cuisine: Option<String>,
    pub bar: Option<String>,
    pub info: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seo {
    pub base_url: Option<String>,
    pub search_engine_indexing: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Legal {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vat_number: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pages {
    pub privacy_cookie_policy: PageSeo,
    pub allergens: PageSeo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageSeo {
    pub slug: Option<String>,
    pub title: Localized,
    pub description: Localized,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Localized {
    pub it: Option<String>,
    pub en: Option<String>,
}

impl Localized {
    pub fn get(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::It => non_blank(&self.it),
            Language::En => non_blank(&self.en),
        }
    }
}

/// The static pages built from Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    PrivacyCookiePolicy,
    Allergens,
}

impl PageKind {
    pub const ALL: [PageKind; 2] = [PageKind::PrivacyCookiePolicy, PageKind::Allergens];

    /// Markdown source stem under the content directory.
    pub fn source_stem(self) -> &'static str {
        match self {
            PageKind::PrivacyCookiePolicy => "privacy-policy",
            PageKind::Allergens => "allergens",
        }
    }

    fn default_slug(self) -> &'static str {
        match self {
            PageKind::PrivacyCookiePolicy => "privacy-cookie-policy",
            PageKind::Allergens => "allergens",
        }
    }

    pub fn default_title(self, lang: Language) -> &'static str {
        match self {
            PageKind::PrivacyCookiePolicy => lang.pick("Privacy e Cookie Policy", "Privacy and Cookie Policy"),
            PageKind::Allergens => lang.pick("Informazioni sugli Allergeni", "Allergen Information"),
        }
    }

    pub fn default_description(self, lang: Language) -> &'static str {
        match self {
            PageKind::PrivacyCookiePolicy => lang.pick("Informativa sulla privacy", "Privacy policy"),
            PageKind::Allergens => lang.pick("Lista allergeni", "Allergen list"),
        }
    }
}

/// Treats `Some("")` like `None`.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn base_url(&self) -> &str {
        non_blank(&self.seo.base_url).unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn indexing_enabled(&self) -> bool {
        self.seo.search_engine_indexing.unwrap_or(false)
    }

    pub fn app_name(&self) -> Option<&str> {
        non_blank(&self.app.name)
    }

    pub fn accent_color(&self) -> Option<&str> {
        non_blank(&self.app.accent_color)
    }

    pub fn logo_url(&self) -> Option<&str> {
        non_blank(&self.app.logo_url)
    }

    fn page_seo(&self, kind: PageKind) -> &PageSeo {
        match kind {
            PageKind::PrivacyCookiePolicy => &self.pages.privacy_cookie_policy,
            PageKind::Allergens => &self.pages.allergens,
        }
    }

    pub fn page_slug(&self, kind: PageKind) -> &str {
        non_blank(&self.page_seo(kind).slug).unwrap_or(kind.default_slug())
    }

    pub fn page_title(&self, kind: PageKind, lang: Language) -> &str {
        self.page_seo(kind)
            .title
            .get(lang)
            .unwrap_or(kind.default_title(lang))
    }

    pub fn page_description(&self, kind: PageKind, lang: Language) -> &str {
        self.page_seo(kind)
            .description
            .get(lang)
            .unwrap_or(kind.default_description(lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_loads() {
        let site = SiteConfig::load(Path::new("tests/fixtures/config.json")).unwrap();
        assert_eq!(site.app_name(), Some("Osteria Scomoda"));
        assert_eq!(site.base_url(), "https://osteria.example");
        assert!(site.indexing_enabled());
        assert_eq!(site.contact.socials.len(), 1);
        assert_eq!(site.page_slug(PageKind::Allergens), "allergeni");
        assert_eq!(site.page_title(PageKind::Allergens, Language::It), "Allergeni & <Info>");
        assert_eq!(site.page_title(PageKind::Allergens, Language::En), "Allergen Information");
    }

    #[test]
    fn defaults_for_empty_document() {
        let site = SiteConfig::from_json("{}").unwrap();
        assert_eq!(site.base_url(), DEFAULT_BASE_URL);
        assert!(!site.indexing_enabled());
        assert_eq!(site.page_slug(PageKind::PrivacyCookiePolicy), "privacy-cookie-policy");
        assert_eq!(
            site.page_description(PageKind::PrivacyCookiePolicy, Language::It),
            "Informativa sulla privacy"
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let site = SiteConfig::from_json(r#"{"seo": {"baseUrl": ""}, "app": {"name": ""}}"#).unwrap();
        assert_eq!(site.base_url(), DEFAULT_BASE_URL);
        assert_eq!(site.app_name(), None);
    }

    #[test]
    fn missing_and_invalid_files() {
        assert!(matches!(
            SiteConfig::load(Path::new("tests/fixtures/nope.json")),
            Err(ConfigError::Missing(_))
        ));
        assert!(matches!(
            SiteConfig::load(Path::new("tests/fixtures/info.csv")),
            Err(ConfigError::Parse { .. })
        ));
    }
}
