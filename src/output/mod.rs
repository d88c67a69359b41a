pub mod report;

use serde::Serialize;

use crate::badge::{self, BadgeState};
use crate::model::Company;

pub const NO_RESULTS_MESSAGE: &str = "Nenhum resultado encontrado.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// One rendered card plus the detail fields behind it. `badge` is "logo",
/// "fallback", or "pending"; `logo_url` is set only when a candidate loaded.
#[derive(Clone, Debug, Serialize)]
pub struct CardRecord {
    pub name: String,
    pub sector: Option<String>,
    pub sector_label: String,
    pub summary: String,
    pub badge: String,
    pub logo_url: Option<String>,
    pub logo_candidates: Vec<String>,
    pub alt_text: Option<String>,
    pub short: Option<String>,
    pub description: Option<String>,
    pub service: Option<String>,
    pub contact: Option<String>,
    pub website: Option<String>,
    pub selo: Option<String>,
    pub practices: Vec<String>,
    pub certifications: Vec<String>,
}

pub fn build_cards(view: &[&Company], badges: &[BadgeState]) -> Vec<CardRecord> {
    view.iter()
        .enumerate()
        .map(|(i, company)| {
            let state = badges
                .get(i)
                .cloned()
                .unwrap_or_else(|| badge::initial_state(company));
            let (badge, logo_url) = match state {
                BadgeState::Loaded(url) => ("logo".to_string(), Some(url)),
                BadgeState::Trying(_) => ("pending".to_string(), None),
                BadgeState::Exhausted => ("fallback".to_string(), None),
            };
            CardRecord {
                name: company.name.clone(),
                sector: company.sector_value().map(|s| s.to_string()),
                sector_label: company.sector_label().to_string(),
                summary: company.summary(),
                badge,
                logo_url,
                logo_candidates: badge::logo_candidates(company),
                alt_text: company.alt_text.clone(),
                short: company.short.clone(),
                description: company.description.clone(),
                service: company.service.clone(),
                contact: company.contact.clone(),
                website: company.website.clone(),
                selo: company.selo.clone(),
                practices: company.practices.clone(),
                certifications: company.certifications.clone(),
            }
        })
        .collect()
}

pub fn render_text(records: &[CardRecord]) -> Vec<u8> {
    if records.is_empty() {
        return format!("{NO_RESULTS_MESSAGE}\n").into_bytes();
    }
    let mut out = String::new();
    for r in records {
        let marker = match r.badge.as_str() {
            "logo" => "[logo]",
            "pending" => "[....]",
            _ => "[SELO VERDE]",
        };
        out.push_str(&format!("{} {}\n", marker, r.name));
        out.push_str(&format!("    {}\n", r.sector_label));
        out.push_str(&format!("    {}\n", r.summary));
        if let Some(url) = r.logo_url.as_deref() {
            out.push_str(&format!("    logo: {url}\n"));
        }
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(records: &[CardRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub fn render_html(records: &[CardRecord], sectors: &[String]) -> Vec<u8> {
    report::render_html(records, sectors)
}

/// The four entities the directory markup needs escaped.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Percent-encode a URL for use as a link target, leaving the characters a
/// full URI may legitimately contain (reserved set plus unreserved marks).
pub fn encode_uri(value: &str) -> String {
    const KEEP: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789;,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        if KEEP.contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_the_four_entities() {
        assert_eq!(
            escape_html(r#"<b>&"x"</b>"#),
            "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn encode_uri_keeps_url_structure() {
        assert_eq!(
            encode_uri("https://eco.example/a b?q=1&x=2"),
            "https://eco.example/a%20b?q=1&x=2"
        );
    }

    #[test]
    fn encode_uri_encodes_multibyte_as_utf8_bytes() {
        assert_eq!(encode_uri("água"), "%C3%A1gua");
    }

    #[test]
    fn infer_format_matches_known_extensions() {
        assert_eq!(infer_format_from_path("out.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("OUT.HTML"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("out.txt"), Some(OutputFormat::Text));
        assert_eq!(infer_format_from_path("out.bin"), None);
    }

    #[test]
    fn render_text_shows_no_results_marker_for_empty_view() {
        let rendered = String::from_utf8(render_text(&[])).unwrap();
        assert!(rendered.contains(NO_RESULTS_MESSAGE));
    }
}
