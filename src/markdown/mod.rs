//! Markdown subset used by the legal and allergen pages.
//!
//! Line oriented, one pass per stage: block patterns on whole lines, then
//! inline patterns, then list grouping, then paragraph wrapping. Nested
//! structures, tables and code spans are not recognized and pass through.

pub mod template;

use std::sync::LazyLock;

use regex::Regex;

static QUOTE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s*\*\*(.+?)\*\*:\s*(.+)$").unwrap());
static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>\s*(.+)$").unwrap());
static NUMBERED_H3_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^### (\d+)\.\s*(.+)$").unwrap());
static H3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^### (.+)$").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^## (.+)$").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^# (.+)$").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^- (.+)$").unwrap());
static ADJACENT_LISTS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</ul>\s*<ul>").unwrap());

/// Lines starting with one of these are already block markup.
const BLOCK_TAGS: &[&str] = &[
    "<h", "<ul", "</ul", "<li", "<hr", "<blockquote", "<p", "<div", "<table", "<!--",
];

pub fn to_html(markdown: &str) -> String {
    let lines: Vec<String> = markdown
        .lines()
        .map(|line| inline(&block(line)))
        .map(|line| list_item(&line))
        .collect();

    let html = wrap_lists(lines)
        .iter()
        .map(|line| paragraph(line))
        .collect::<Vec<_>>()
        .join("\n");

    ADJACENT_LISTS_RE
        .replace_all(&html, "")
        .replace("<p></p>", "")
}

/// Whole-line block patterns. First match wins.
fn block(line: &str) -> String {
    if let Some(caps) = QUOTE_LABEL_RE.captures(line) {
        return format!("<blockquote><strong>{}:</strong> {}</blockquote>", &caps[1], &caps[2]);
    }
    if let Some(caps) = QUOTE_RE.captures(line) {
        return format!("<blockquote>{}</blockquote>", &caps[1]);
    }
    if let Some(caps) = NUMBERED_H3_RE.captures(line) {
        return format!(
            "<h3><span class=\"allergen-number\">{}.</span> {}</h3>",
            &caps[1], &caps[2]
        );
    }
    if let Some(caps) = H3_RE.captures(line) {
        return format!("<h3>{}</h3>", &caps[1]);
    }
    if let Some(caps) = H2_RE.captures(line) {
        return format!("<h2>{}</h2>", &caps[1]);
    }
    if let Some(caps) = H1_RE.captures(line) {
        return format!("<h1>{}</h1>", &caps[1]);
    }
    if line == "---" {
        return "<hr>".to_string();
    }
    line.to_string()
}

/// Bold before italic, so `**x**` never reads as two italics.
fn inline(line: &str) -> String {
    let line = BOLD_RE.replace_all(line, "<strong>${1}</strong>");
    let line = ITALIC_RE.replace_all(&line, "<em>${1}</em>");
    LINK_RE
        .replace_all(&line, r#"<a href="${2}" target="_blank" rel="noopener">${1}</a>"#)
        .into_owned()
}

fn list_item(line: &str) -> String {
    match LIST_ITEM_RE.captures(line) {
        Some(caps) => format!("<li>{}</li>", &caps[1]),
        None => line.to_string(),
    }
}

/// Open a `<ul>` on the first line of each run of items and close it on the last.
fn wrap_lists(mut lines: Vec<String>) -> Vec<String> {
    let is_item = |l: &str| l.starts_with("<li>");
    let mut i = 0;
    while i < lines.len() {
        if !is_item(&lines[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < lines.len() && is_item(&lines[i + 1]) {
            i += 1;
        }
        lines[start].insert_str(0, "<ul>");
        lines[i].push_str("</ul>");
        i += 1;
    }
    lines
}

fn paragraph(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if BLOCK_TAGS.iter().any(|tag| trimmed.starts_with(tag)) {
        return line.to_string();
    }
    format!("<p>{}</p>", trimmed)
}
