//! Static bilingual pages built from the Markdown sources in the content
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use tera::Tera;
use tracing::{error, info};

use crate::i18n::{labels, Language};
use crate::markdown::template::{substitute, LegalFields};
use crate::markdown::to_html;
use crate::settings::Settings;
use crate::site::{PageKind, SiteConfig};

const PAGE_SHELL: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0, viewport-fit=cover">
    <meta name="description" content="{{ description }}">
    <meta name="theme-color" content="#ffffff">
    <title>{{ title }}</title>

    <link rel="canonical" href="{{ canonical_url | safe }}">
    <link rel="alternate" hreflang="it" href="{{ it_url | safe }}">
    <link rel="alternate" hreflang="en" href="{{ en_url | safe }}">
    <link rel="alternate" hreflang="x-default" href="{{ en_url | safe }}">

    <link rel="stylesheet" href="../../assets/css/colors.css">
    <link rel="stylesheet" href="../../assets/css/styles.css">
    <link rel="stylesheet" href="../../assets/css/pages.css">
</head>
<body>
    <header class="page-header">
        <div class="page-header-content">
            <a href="../../index.html" class="back-button">
                <span class="back-arrow">←</span>
                {{ back_label }}
            </a>
            <a href="../{{ other_lang }}/{{ page_file | safe }}" class="lang-switch" aria-label="Switch language">
                {{ lang_flag }}
            </a>
        </div>
    </header>

    <main class="page-container">
        <article class="page-content">
{{ content | safe }}
        </article>

        <div class="footer-cta">
            <a href="../../index.html" class="cta-button">
                <span>←</span>
                {{ back_label }}
            </a>
        </div>
    </main>
</body>
</html>
"##;

/// One output file: a page kind in one language.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub kind: PageKind,
    pub lang: Language,
}

impl PageSpec {
    pub fn all() -> Vec<PageSpec> {
        PageKind::ALL
            .into_iter()
            .flat_map(|kind| {
                [Language::It, Language::En]
                    .into_iter()
                    .map(move |lang| PageSpec { kind, lang })
            })
            .collect()
    }

    pub fn source_name(self) -> String {
        format!("{}.{}.md", self.kind.source_stem(), self.lang.code())
    }

    /// Relative to the pages directory.
    pub fn output_name(self, site: &SiteConfig) -> PathBuf {
        Path::new(self.lang.code()).join(format!("{}.html", site.page_slug(self.kind)))
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

/// Wrap rendered Markdown in the page shell.
pub fn render_page(content: &str, spec: PageSpec, site: &SiteConfig) -> Result<String> {
    let lang = spec.lang;
    let base_url = site.base_url();
    let page_file = format!("{}.html", site.page_slug(spec.kind));
    let it_url = format!("{base_url}/pages/it/{page_file}");
    let en_url = format!("{base_url}/pages/en/{page_file}");
    let canonical_url = match lang {
        Language::It => &it_url,
        Language::En => &en_url,
    };

    let mut ctx = tera::Context::new();
    ctx.insert("lang", lang.code());
    ctx.insert("title", site.page_title(spec.kind, lang));
    ctx.insert("description", site.page_description(spec.kind, lang));
    ctx.insert("canonical_url", canonical_url);
    ctx.insert("it_url", &it_url);
    ctx.insert("en_url", &en_url);
    ctx.insert("back_label", labels(lang).back_to_menu);
    ctx.insert("other_lang", lang.other().code());
    // Flag of the language the switch leads to.
    ctx.insert("lang_flag", lang.pick("🇬🇧", "🇮🇹"));
    ctx.insert("page_file", &page_file);
    ctx.insert("content", content);

    Ok(Tera::one_off(PAGE_SHELL, &ctx, true)?)
}

fn build_one(spec: PageSpec, settings: &Settings, site: &SiteConfig, fields: &LegalFields) -> Result<PathBuf> {
    let source = settings.content_dir().join(spec.source_name());
    let markdown = std::fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let html = render_page(&to_html(&substitute(&markdown, fields)), spec, site)?;

    let output = settings.pages_dir().join(spec.output_name(site));
    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(&output, html).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(output)
}

/// Build every page. A page that fails is logged and skipped.
pub fn build(settings: &Settings, site: &SiteConfig, today: NaiveDate) -> Result<BuildReport> {
    let fields = LegalFields::resolve(site, today);
    let specs = PageSpec::all();

    let pb = ProgressBar::new(specs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut report = BuildReport::default();
    for spec in specs {
        pb.set_message(spec.source_name());
        match build_one(spec, settings, site, &fields) {
            Ok(path) => {
                info!(path = %path.display(), "generated page");
                report.written.push(path);
            }
            Err(e) => {
                error!(source = %spec.source_name(), error = %format!("{e:#}"), "page build failed");
                report.failed.push((spec.source_name(), format!("{e:#}")));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(report)
}

/// [`build`] dated today.
pub fn build_today(settings: &Settings, site: &SiteConfig) -> Result<BuildReport> {
    build(settings, site, Local::now().date_naive())
}
