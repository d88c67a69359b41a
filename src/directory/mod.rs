use std::cmp::Ordering;
use std::collections::HashSet;

use crate::model::Company;

/// Loaded dataset plus the two filter inputs. Records are never mutated or
/// reordered after load; filtering produces index views into the list.
#[derive(Clone, Debug)]
pub struct DirectoryState {
    companies: Vec<Company>,
    active_sector: Option<String>,
    last_search: String,
}

impl DirectoryState {
    pub fn new(companies: Vec<Company>) -> Self {
        Self {
            companies,
            active_sector: None,
            last_search: String::new(),
        }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn active_sector(&self) -> Option<&str> {
        self.active_sector.as_deref()
    }

    pub fn last_search(&self) -> &str {
        &self.last_search
    }

    /// A blank or absent sector clears the filter back to "all".
    pub fn set_sector(&mut self, sector: Option<&str>) {
        self.active_sector = sector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    pub fn set_search(&mut self, raw: &str) {
        self.last_search = raw.trim().to_lowercase();
    }

    /// Indices of the companies that pass both filters, in input order.
    ///
    /// `realtime` only matters for an empty query: a live (per-keystroke)
    /// empty query filters with the empty substring, an explicit submit with
    /// an empty query resets to the sector-only view. Both produce the same
    /// set; the distinction is kept because callers trigger them differently.
    pub fn filtered_indices(&self, realtime: bool) -> Vec<usize> {
        let mut out = Vec::new();
        for (idx, company) in self.companies.iter().enumerate() {
            if !sector_matches(company, self.active_sector.as_deref()) {
                continue;
            }
            if self.last_search.is_empty() && !realtime {
                out.push(idx);
                continue;
            }
            if company.search_haystack().contains(&self.last_search) {
                out.push(idx);
            }
        }
        out
    }

    pub fn apply_filters(&self, realtime: bool) -> Vec<&Company> {
        self.filtered_indices(realtime)
            .into_iter()
            .map(|idx| &self.companies[idx])
            .collect()
    }
}

/// Whole-value, case-insensitive sector equality. A record without a sector
/// never matches an active sector filter. Both sides are compared trimmed
/// (`sector_value` and `set_sector` trim), so a record whose sector carries
/// stray whitespace still matches the option derived from it; this is looser
/// than strict raw-field equality.
fn sector_matches(company: &Company, active: Option<&str>) -> bool {
    match active {
        None => true,
        Some(active) => {
            company.sector_value().map(|s| s.to_lowercase()) == Some(active.to_lowercase())
        }
    }
}

/// Distinct non-empty trimmed sector values, locale-sorted. Distinctness is
/// case-sensitive, matching the raw option labels shown to the user.
pub fn sector_options(companies: &[Company]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut options: Vec<String> = Vec::new();
    for company in companies {
        if let Some(sector) = company.sector_value() {
            if seen.insert(sector) {
                options.push(sector.to_string());
            }
        }
    }
    options.sort_by(|a, b| locale_cmp(a, b));
    options
}

/// pt-BR-ish collation: case- and accent-insensitive primary key with the raw
/// value as tiebreak, so "Água" sorts next to "agua" instead of after "z".
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    match fold_for_collation(a).cmp(&fold_for_collation(b)) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

fn fold_for_collation(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
