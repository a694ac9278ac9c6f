use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::i18n::Language;
use crate::settings::Settings;
use crate::site::{PageKind, SiteConfig};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const DISALLOWED: &[&str] = &["/config/", "/scripts/", "/examples/", "/content/", "/node_modules/"];

struct SitemapEntry {
    loc: String,
    priority: &'static str,
    changefreq: &'static str,
}

pub fn robots_txt(site_name: &str, base_url: &str, allow_indexing: bool) -> String {
    let status = if allow_indexing { "ENABLED" } else { "DISABLED" };
    let mut lines = vec![
        format!("# Robots.txt for {site_name}"),
        format!("# {base_url}"),
        "#".to_string(),
        format!("# Search engine indexing: {status}"),
        "# To change this, edit config/config.json -> seo.searchEngineIndexing".to_string(),
        String::new(),
        "User-agent: *".to_string(),
    ];

    if allow_indexing {
        lines.push("Allow: /".to_string());
        lines.push(String::new());
        lines.push("# Disallow config and build files".to_string());
        lines.extend(DISALLOWED.iter().map(|path| format!("Disallow: {path}")));
    } else {
        lines.push("Disallow: /".to_string());
    }

    lines.push(String::new());
    lines.push("# Sitemap location".to_string());
    lines.push(format!("Sitemap: {base_url}/sitemap.xml"));
    lines.push(String::new());
    lines.join("\n")
}

fn sitemap_entries(site: &SiteConfig) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry {
        loc: "/".to_string(),
        priority: "1.0",
        changefreq: "daily",
    }];
    for kind in PageKind::ALL {
        let priority = match kind {
            PageKind::PrivacyCookiePolicy => "0.5",
            PageKind::Allergens => "0.6",
        };
        for lang in [Language::It, Language::En] {
            entries.push(SitemapEntry {
                loc: format!("/pages/{}/{}.html", lang.code(), site.page_slug(kind)),
                priority,
                changefreq: "monthly",
            });
        }
    }
    entries
}

pub fn sitemap_xml(base_url: &str, lastmod: NaiveDate, site: &SiteConfig) -> Result<String> {
    let lastmod = lastmod.format("%Y-%m-%d").to_string();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;
    for entry in sitemap_entries(site) {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        let loc = format!("{base_url}{}", entry.loc);
        for (tag, value) in [
            ("loc", loc.as_str()),
            ("lastmod", lastmod.as_str()),
            ("changefreq", entry.changefreq),
            ("priority", entry.priority),
        ] {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// Write `robots.txt` and `sitemap.xml`. The site config is required here.
pub fn build(settings: &Settings) -> Result<()> {
    let config_path = settings.config_path();
    let site = SiteConfig::load(&config_path)?;
    let base_url = site.base_url();
    let allow = site.indexing_enabled();

    println!("Generating SEO files for: {}", base_url);
    println!(
        "Search engine indexing: {}\n",
        if allow { "ENABLED" } else { "DISABLED" }
    );

    let robots_path = settings.robots_path();
    let robots = robots_txt(site.app_name().unwrap_or("sheet_menu"), base_url, allow);
    std::fs::write(&robots_path, robots)
        .with_context(|| format!("Failed to write {}", robots_path.display()))?;
    info!(path = %robots_path.display(), "wrote robots.txt");
    println!("✓ Generated: robots.txt");

    let sitemap_path = settings.sitemap_path();
    let sitemap = sitemap_xml(base_url, Local::now().date_naive(), &site)?;
    std::fs::write(&sitemap_path, sitemap)
        .with_context(|| format!("Failed to write {}", sitemap_path.display()))?;
    info!(path = %sitemap_path.display(), "wrote sitemap.xml");
    println!("✓ Generated: sitemap.xml");

    Ok(())
}
