use crate::badge::{self, BadgeState};
use crate::directory::{self, DirectoryState};
use crate::model::Company;
use crate::output;

fn company(name: &str, sector: Option<&str>, description: Option<&str>) -> Company {
    Company {
        name: name.to_string(),
        sector: sector.map(|s| s.to_string()),
        description: description.map(|d| d.to_string()),
        ..Company::default()
    }
}

fn sample_dataset() -> Vec<Company> {
    vec![
        company("EcoCorp", Some("Reciclagem"), Some("Recicla tudo")),
        company("BioFuel", Some("Energia"), Some("Energia renovável")),
        company("GreenLog", None, None),
    ]
}

#[test]
fn sector_and_search_combine_with_and() {
    let mut state = DirectoryState::new(sample_dataset());
    state.set_sector(Some("Reciclagem"));
    state.set_search("eco");
    let view = state.apply_filters(false);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].name, "EcoCorp");
}

#[test]
fn search_is_case_insensitive() {
    let mut state = DirectoryState::new(sample_dataset());
    state.set_search("ECO");
    let view = state.apply_filters(true);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].name, "EcoCorp");
}

#[test]
fn sector_prefix_matches_nothing() {
    let mut state = DirectoryState::new(sample_dataset());
    state.set_sector(Some("Recic"));
    assert!(state.apply_filters(false).is_empty());
}

#[test]
fn search_covers_description_and_sector_fields() {
    let mut state = DirectoryState::new(sample_dataset());
    state.set_search("renovável");
    let view = state.apply_filters(true);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].name, "BioFuel");

    state.set_search("energia");
    // matches BioFuel twice over (sector and description) but yields it once
    assert_eq!(state.apply_filters(true).len(), 1);
}

#[test]
fn clearing_the_search_restores_the_sector_view() {
    let mut state = DirectoryState::new(sample_dataset());
    state.set_sector(Some("Energia"));
    state.set_search("bio");
    assert_eq!(state.apply_filters(true).len(), 1);
    state.set_search("");
    assert_eq!(state.apply_filters(false).len(), 1);
    state.set_sector(None);
    assert_eq!(state.apply_filters(false).len(), 3);
}

#[test]
fn disjoint_sector_and_search_yield_the_no_results_indicator() {
    let mut state = DirectoryState::new(sample_dataset());
    // "eco" only matches a Reciclagem company, so the AND is empty
    state.set_sector(Some("Energia"));
    state.set_search("eco");
    let view = state.apply_filters(false);
    assert!(view.is_empty());

    let records = output::build_cards(&view, &[]);
    assert!(records.is_empty());
    let rendered = String::from_utf8(output::render_text(&records)).unwrap();
    assert!(rendered.contains(output::NO_RESULTS_MESSAGE));
}

#[test]
fn long_description_is_capped_with_ellipsis() {
    let record = company("Verbose", None, Some(&"palavra ".repeat(40)));
    let summary = record.summary();
    assert!(summary.chars().count() <= 161);
    assert!(summary.ends_with('…'));
}

#[test]
fn candidate_chain_for_files_prefixed_logo() {
    let record = Company {
        name: "EcoCorp".to_string(),
        logo_filename: Some("files/x.png".to_string()),
        ..Company::default()
    };
    assert_eq!(
        badge::logo_candidates(&record),
        vec!["files/x.png", "x.png", "/x.png", "x.png"]
    );
}

#[test]
fn cards_report_fallback_badge_on_exhaustion() {
    let companies = sample_dataset();
    let view: Vec<&Company> = companies.iter().collect();
    let badges = vec![
        BadgeState::Exhausted,
        BadgeState::Loaded("https://selo.example/bio.png".to_string()),
        BadgeState::Exhausted,
    ];
    let records = output::build_cards(&view, &badges);
    assert_eq!(records[0].badge, "fallback");
    assert!(records[0].logo_url.is_none());
    assert_eq!(records[1].badge, "logo");
    assert_eq!(
        records[1].logo_url.as_deref(),
        Some("https://selo.example/bio.png")
    );
}

#[test]
fn cards_carry_placeholders_for_missing_fields() {
    let companies = sample_dataset();
    let view: Vec<&Company> = companies.iter().collect();
    let badges: Vec<BadgeState> = view.iter().map(|c| badge::initial_state(c)).collect();
    let records = output::build_cards(&view, &badges);
    assert_eq!(records[2].sector_label, "Setor não informado");
    assert_eq!(records[2].summary, "Sem descrição disponível.");
}

#[test]
fn json_export_round_trips_through_serde() {
    let companies = sample_dataset();
    let view: Vec<&Company> = companies.iter().collect();
    let badges: Vec<BadgeState> = view.iter().map(|c| badge::initial_state(c)).collect();
    let records = output::build_cards(&view, &badges);
    let rendered = output::render_json(&records);
    let parsed: serde_json::Value = serde_json::from_slice(&rendered).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 3);
    assert_eq!(parsed[0]["name"], "EcoCorp");
    assert_eq!(parsed[2]["sector"], serde_json::Value::Null);
}

#[test]
fn sector_options_follow_locale_order() {
    let companies = vec![
        company("A", Some("água"), None),
        company("B", Some("Energia"), None),
        company("C", Some("Água"), None),
    ];
    let options = directory::sector_options(&companies);
    // accent-folded primary key groups the two spellings before "Energia"
    assert_eq!(options, vec!["Água", "água", "Energia"]);
}
