use serde::Deserialize;

pub const SUMMARY_LIMIT: usize = 160;
pub const SUMMARY_BACKTRACK_MIN: usize = 120;

pub const NO_DESCRIPTION_PLACEHOLDER: &str = "Sem descrição disponível.";
pub const SECTOR_PLACEHOLDER: &str = "Setor não informado";

/// One company record as it appears in the dataset JSON array.
/// Everything except the name is optional; unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Company {
    #[serde(default)]
    pub name: String,
    pub short: Option<String>,
    pub description: Option<String>,
    pub service: Option<String>,
    pub sector: Option<String>,
    pub contact: Option<String>,
    pub website: Option<String>,
    pub selo: Option<String>,
    pub logo: Option<String>,
    pub logo_filename: Option<String>,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub practices: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl Company {
    /// Trimmed sector value, or None when the field is absent or blank.
    pub fn sector_value(&self) -> Option<&str> {
        self.sector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn sector_label(&self) -> &str {
        self.sector_value().unwrap_or(SECTOR_PLACEHOLDER)
    }

    /// Raw logo identifier: logo_filename wins over logo, blanks count as absent.
    pub fn logo_identifier(&self) -> Option<&str> {
        self.logo_filename
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.logo.as_deref().filter(|s| !s.is_empty()))
    }

    /// Lower-cased concatenation of the searchable fields, joined with single
    /// spaces. Missing fields contribute an empty string so field positions
    /// stay stable.
    pub fn search_haystack(&self) -> String {
        [
            Some(self.name.as_str()),
            self.short.as_deref(),
            self.description.as_deref(),
            self.service.as_deref(),
            self.sector.as_deref(),
            self.contact.as_deref(),
        ]
        .iter()
        .map(|f| f.unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }

    /// Card summary text. A non-empty trimmed `short` is used verbatim.
    /// Otherwise the description is whitespace-collapsed and capped at 160
    /// characters; when the cap lands mid-word and the last space sits after
    /// position 120 the cut backs up to that space. Capped summaries get an
    /// ellipsis appended.
    pub fn summary(&self) -> String {
        if let Some(short) = self.short.as_deref() {
            let short = short.trim();
            if !short.is_empty() {
                return short.to_string();
            }
        }

        let clean = collapse_whitespace(self.description.as_deref().unwrap_or(""));
        if clean.is_empty() {
            return NO_DESCRIPTION_PLACEHOLDER.to_string();
        }

        let chars: Vec<char> = clean.chars().collect();
        if chars.len() <= SUMMARY_LIMIT {
            return clean;
        }

        let cut = &chars[..SUMMARY_LIMIT];
        let end = match cut.iter().rposition(|&c| c == ' ') {
            Some(idx) if idx > SUMMARY_BACKTRACK_MIN => idx,
            _ => SUMMARY_LIMIT,
        };
        let mut out: String = cut[..end].iter().collect();
        out.push('…');
        out
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
