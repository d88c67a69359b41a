use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use indicatif::ProgressBar;
use reqwest::Url;
use tokio::sync::mpsc;

use crate::model::Company;

pub const FALLBACK_BADGE_TOP: &str = "SELO";
pub const FALLBACK_BADGE_BOTTOM: &str = "VERDE";

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Per-card logo resolution state. `Trying(i)` means candidate `i` is the
/// next one to probe; the state is terminal once a candidate loads or the
/// list is exhausted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BadgeState {
    Trying(usize),
    Loaded(String),
    Exhausted,
}

/// Candidate paths for a company logo, in probe order:
/// the raw identifier, the identifier with a leading `files/` stripped, that
/// value made root-relative, and the stripped value with a leading `assets/`
/// also removed. Duplicates are kept; empty rewrites are dropped.
pub fn logo_candidates(company: &Company) -> Vec<String> {
    let Some(value) = company.logo_identifier() else {
        return Vec::new();
    };
    let without_files = value.strip_prefix("files/").unwrap_or(value);
    let without_assets = without_files
        .strip_prefix("assets/")
        .unwrap_or(without_files);
    let mut candidates = vec![
        value.to_string(),
        without_files.to_string(),
        format!("/{without_files}"),
        without_assets.to_string(),
    ];
    candidates.retain(|c| !c.is_empty());
    candidates
}

/// State before any probing: companies without a usable identifier go
/// straight to the textual badge.
pub fn initial_state(company: &Company) -> BadgeState {
    if logo_candidates(company).is_empty() {
        BadgeState::Exhausted
    } else {
        BadgeState::Trying(0)
    }
}

async fn probe_candidate(client: &reqwest::Client, base: &Url, candidate: &str) -> Option<String> {
    let url = base.join(candidate).ok()?;
    match client.get(url.clone()).send().await {
        Ok(response) if response.status().is_success() => Some(url.to_string()),
        _ => None,
    }
}

async fn resolve(
    client: &reqwest::Client,
    base: &Url,
    company: &Company,
    lim: &DirectLimiter,
) -> BadgeState {
    for candidate in logo_candidates(company) {
        lim.until_ready().await;
        if let Some(url) = probe_candidate(client, base, &candidate).await {
            return BadgeState::Loaded(url);
        }
    }
    BadgeState::Exhausted
}

/// Probe every card in the view sequentially, advancing the progress bar per
/// card. Resolution is deliberately per card even when identifiers repeat.
pub async fn probe_view(
    client: &reqwest::Client,
    base: &Url,
    view: &[&Company],
    rate: u32,
    pb: &ProgressBar,
) -> Vec<BadgeState> {
    let lim = RateLimiter::direct(Quota::per_second(
        NonZeroU32::new(rate.max(1)).unwrap_or(NonZeroU32::MIN),
    ));
    let mut states = Vec::with_capacity(view.len());
    for company in view {
        let state = resolve(client, base, company, &lim).await;
        pb.inc(1);
        states.push(state);
    }
    states
}

/// One badge state change, keyed by the company's index in the loaded list.
#[derive(Clone, Debug)]
pub struct BadgeUpdate {
    pub index: usize,
    pub state: BadgeState,
}

/// Background probe task for the interactive browser: walks the whole list
/// and streams `Trying`/terminal transitions over the channel. Stops early
/// when the receiver goes away.
pub async fn probe_all(
    client: reqwest::Client,
    base: Url,
    companies: Vec<Company>,
    rate: u32,
    tx: mpsc::Sender<BadgeUpdate>,
) {
    let lim = RateLimiter::direct(Quota::per_second(
        NonZeroU32::new(rate.max(1)).unwrap_or(NonZeroU32::MIN),
    ));
    for (index, company) in companies.iter().enumerate() {
        let candidates = logo_candidates(company);
        let mut state = BadgeState::Exhausted;
        for (i, candidate) in candidates.iter().enumerate() {
            if tx
                .send(BadgeUpdate {
                    index,
                    state: BadgeState::Trying(i),
                })
                .await
                .is_err()
            {
                return;
            }
            lim.until_ready().await;
            if let Some(url) = probe_candidate(&client, &base, candidate).await {
                state = BadgeState::Loaded(url);
                break;
            }
        }
        if tx.send(BadgeUpdate { index, state }).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_logo(value: &str) -> Company {
        Company {
            name: "EcoCorp".to_string(),
            logo_filename: Some(value.to_string()),
            ..Company::default()
        }
    }

    #[test]
    fn candidates_keep_order_and_duplicates() {
        assert_eq!(
            logo_candidates(&with_logo("files/x.png")),
            vec!["files/x.png", "x.png", "/x.png", "x.png"]
        );
    }

    #[test]
    fn candidates_strip_assets_prefix_last() {
        assert_eq!(
            logo_candidates(&with_logo("assets/logo.svg")),
            vec!["assets/logo.svg", "assets/logo.svg", "/assets/logo.svg", "logo.svg"]
        );
    }

    #[test]
    fn candidates_drop_empty_rewrites() {
        assert_eq!(logo_candidates(&with_logo("files/")), vec!["files/", "/"]);
    }

    #[test]
    fn no_identifier_means_exhausted_from_the_start() {
        let company = Company::default();
        assert!(logo_candidates(&company).is_empty());
        assert_eq!(initial_state(&company), BadgeState::Exhausted);
        assert_eq!(initial_state(&with_logo("x.png")), BadgeState::Trying(0));
    }
}
