mod csv;
mod fetch;
mod i18n;
mod info;
mod markdown;
mod menu;
mod pages;
mod prefs;
mod render;
mod seo;
mod settings;
mod site;
mod state;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fetch::Fetcher;
use i18n::Language;
use menu::allergen::Allergen;
use menu::filter::{DietFilter, FilterState};
use prefs::{PreferenceStore, Preferences};
use settings::Settings;
use site::{SiteConfig, SourceUrls};
use state::{AppState, Redraw, Tab};

#[derive(Parser)]
#[command(name = "sheet_menu", about = "Restaurant menu and info pages from published spreadsheets")]
struct Cli {
    /// Site root (overrides SHEET_MENU_ROOT_DIR)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a menu tab as HTML
    Menu {
        #[arg(short, long, value_enum, default_value_t = Tab::Cuisine)]
        tab: Tab,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render the info tab (hours, contacts, links) as HTML
    Info {
        #[arg(short, long, value_enum)]
        lang: Option<Language>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Keep an output file current, refetching stale data
    Watch {
        #[arg(short, long, value_enum, default_value_t = Tab::Cuisine)]
        tab: Tab,
        /// Seconds between staleness checks
        #[arg(short, long, default_value = "60")]
        interval: u64,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Build the static legal and allergen pages from Markdown
    Pages,
    /// Generate robots.txt and sitemap.xml
    Seo,
    /// Show saved preferences
    Prefs {
        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Language and filter changes. Applied through the draft filters and
/// persisted before rendering.
#[derive(clap::Args, Default)]
struct ViewArgs {
    #[arg(short, long, value_enum)]
    lang: Option<Language>,
    #[arg(short, long, value_enum)]
    diet: Option<DietFilter>,
    /// Allergen to hide, by key (glutine), column (all_1_glutine) or id (1)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<Allergen>,
    /// Drop saved filters before applying the ones given here
    #[arg(long)]
    clear_filters: bool,
}

impl ViewArgs {
    fn touches_filters(&self) -> bool {
        self.clear_filters || self.diet.is_some() || !self.exclude.is_empty()
    }

    fn apply(&self, state: AppState) -> AppState {
        let state = match self.lang {
            Some(lang) => state.with_language(lang),
            None => state,
        };
        if !self.touches_filters() {
            return state;
        }
        state
            .edit_draft(|draft| {
                if self.clear_filters {
                    *draft = FilterState::default();
                }
                if let Some(diet) = self.diet {
                    draft.diet = diet;
                }
                draft.excluded.extend(self.exclude.iter().copied());
            })
            .commit_draft()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?.with_root(cli.root);

    let result = match cli.command {
        Commands::Menu { tab, view, out } => show(&settings, tab, &view, out.as_deref()).await,
        Commands::Info { lang, out } => {
            let view = ViewArgs {
                lang,
                ..ViewArgs::default()
            };
            show(&settings, Tab::Info, &view, out.as_deref()).await
        }
        Commands::Watch { tab, interval, out } => watch(&settings, tab, interval, &out).await,
        Commands::Pages => {
            let site = load_site(&settings).unwrap_or_default();
            println!("Building static pages from markdown...\n");
            let report = pages::build_today(&settings, &site)?;
            for path in &report.written {
                println!("✓ Generated: {}", path.display());
            }
            for (source, err) in &report.failed {
                println!("✗ Error processing {}: {}", source, err);
            }
            println!(
                "\nBuilt {} pages ({} errors).",
                report.written.len(),
                report.failed.len()
            );
            Ok(())
        }
        Commands::Seo => seo::build(&settings),
        Commands::Prefs { reset } => {
            let store = PreferenceStore::new(settings.prefs_path());
            if reset {
                store.save(&Preferences::default());
                println!("Preferences reset.");
            }
            match store.load() {
                Some(prefs) => println!("{}", serde_json::to_string_pretty(&prefs)?),
                None => println!("No saved preferences at {}", store.path().display()),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Missing or broken site config only costs branding and locale.
fn load_site(settings: &Settings) -> Option<SiteConfig> {
    match SiteConfig::load(&settings.config_path()) {
        Ok(site) => {
            info!(path = %settings.config_path().display(), "loaded site config");
            Some(site)
        }
        Err(e) => {
            warn!(error = %e, "could not load site config, using defaults");
            None
        }
    }
}

fn source_urls(site: Option<&SiteConfig>) -> SourceUrls {
    site.map(|s| s.urls.clone()).unwrap_or_default()
}

/// Restore saved preferences, apply the command line changes and persist
/// them if anything changed.
fn initial_state(settings: &Settings, tab: Tab, view: &ViewArgs, site: Option<SiteConfig>) -> AppState {
    let store = PreferenceStore::new(settings.prefs_path());
    let saved = store.load().unwrap_or_default();
    let state = AppState::new(tab, &saved);
    let state = match site {
        Some(site) => state.with_site(site),
        None => state.with_config_error(),
    };
    let before = state.preferences();
    let state = view.apply(state);
    if state.preferences() != before {
        store.save(&state.preferences());
    }
    state
}

/// Tabs fetched for a view: the info sheet also carries the menu headers.
fn tabs_for(tab: Tab) -> Vec<Tab> {
    if tab.is_menu() {
        vec![tab, Tab::Info]
    } else {
        vec![Tab::Info]
    }
}

async fn show(settings: &Settings, tab: Tab, view: &ViewArgs, out: Option<&Path>) -> Result<()> {
    let site = load_site(settings);
    let fetcher = Fetcher::new(source_urls(site.as_ref()), settings.data_dir())?;
    let mut state = initial_state(settings, tab, view, site);

    let (current, info) = if tab.is_menu() {
        let (current, info) = tokio::join!(fetcher.fetch(tab), fetcher.fetch(Tab::Info));
        (current, Some(info))
    } else {
        (fetcher.fetch(tab).await, None)
    };

    let now = Utc::now();
    match info {
        Some(Ok(data)) => state = state.apply_fetch(Tab::Info, data, now).0,
        Some(Err(e)) => warn!(error = %e, "info sheet unavailable, rendering without menu header"),
        None => {}
    }
    match current {
        Ok(data) => state = state.apply_fetch(tab, data, now).0,
        Err(e) => {
            write_output(out, &render::error_fragment(state.language()))?;
            return Err(e.into());
        }
    }

    write_output(out, &render::page(&state)?)
}

async fn watch(settings: &Settings, tab: Tab, interval: u64, out: &Path) -> Result<()> {
    let site = load_site(settings);
    let fetcher = Fetcher::new(source_urls(site.as_ref()), settings.data_dir())?;
    let mut state = initial_state(settings, tab, &ViewArgs::default(), site);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    info!(tab = %tab, out = %out.display(), "watching");
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                return Ok(());
            }
        }

        let mut redraw = false;
        for t in tabs_for(tab) {
            let now = Utc::now();
            if !state.is_stale(t, now) {
                continue;
            }
            match fetcher.fetch(t).await {
                Ok(data) => {
                    let (next, r) = state.apply_fetch(t, data, now);
                    state = next;
                    redraw |= r == Redraw::Screen;
                }
                Err(e) if t == tab && state.data(tab).is_none() => {
                    warn!(tab = %t, error = %e, "fetch failed, retrying next tick");
                    write_output(Some(out), &render::error_fragment(state.language()))?;
                }
                Err(e) => warn!(tab = %t, error = %e, "fetch failed, keeping previous data"),
            }
        }

        if redraw {
            write_output(Some(out), &render::page(&state)?)?;
            info!(out = %out.display(), "updated");
        }
    }
}

fn write_output(out: Option<&Path>, html: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{html}");
            Ok(())
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
