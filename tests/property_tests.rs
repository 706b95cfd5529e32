/// Property-based tests for the invariants the pipeline leans on:
/// deduplication keeps exactly one record per normalized key, identity
/// keys are stable under formatting noise, and score/tier are pure
/// recomputable functions of the issue lists.
use std::collections::HashSet;

use lead_prospector::aggregator::dedupe;
use lead_prospector::analysis::{derive_score, derive_tier, IssueCode, Severity, Tier, BATTERY};
use lead_prospector::leads::{priority_for_score, Priority};
use lead_prospector::models::{identity_key, join_key, BusinessCandidate, ProviderTag};
use proptest::prelude::*;

fn candidate(name: &str, address: &str) -> BusinessCandidate {
    BusinessCandidate {
        external_id: String::new(),
        name: name.to_string(),
        address: address.to_string(),
        locality: String::new(),
        region: String::new(),
        postcode: String::new(),
        country: String::new(),
        latitude: None,
        longitude: None,
        phone: String::new(),
        email: String::new(),
        website: None,
        category: String::new(),
        category_id: String::new(),
        source: ProviderTag::Foursquare,
    }
}

fn battery_codes(severity: Severity) -> Vec<IssueCode> {
    BATTERY
        .iter()
        .copied()
        .filter(|code| code.severity() == severity)
        .collect()
}

proptest! {
    #[test]
    fn dedupe_keeps_exactly_one_per_normalized_key(
        pairs in prop::collection::vec((0usize..4, 0usize..4), 0..30)
    ) {
        let names = ["Blue Cup Cafe", "Red Fork Diner", "Oak Dental", "Main St Law"];
        let addresses = ["12 Main St", "99 Oak Ave", "1 High Rd", "7 Low Ln"];
        let candidates: Vec<BusinessCandidate> = pairs
            .iter()
            .map(|&(n, a)| candidate(names[n], addresses[a]))
            .collect();
        let distinct: HashSet<String> =
            candidates.iter().map(BusinessCandidate::join_key).collect();

        let total = candidates.len();
        let (unique, removed) = dedupe(candidates);

        prop_assert_eq!(unique.len(), distinct.len());
        prop_assert_eq!(removed, total - unique.len());
        let surviving: HashSet<String> =
            unique.iter().map(BusinessCandidate::join_key).collect();
        prop_assert_eq!(surviving.len(), unique.len());
    }

    #[test]
    fn identity_key_ignores_case_and_whitespace_noise(
        name in "[A-Za-z][A-Za-z ]{0,15}",
        address in "[0-9]{1,3} [A-Za-z]{1,10} St"
    ) {
        let noisy_name = format!("  {}  ", name.to_uppercase());
        let noisy_address = address.replace(' ', "   ");
        prop_assert_eq!(
            identity_key(&name, &address),
            identity_key(&noisy_name, &noisy_address)
        );
        prop_assert_eq!(join_key(&name, &address), join_key(&noisy_name, &noisy_address));
    }

    #[test]
    fn score_is_recomputable_and_bounded(
        n_crit in 0usize..=14,
        n_high in 0usize..=15,
        n_med in 0usize..=17,
        n_low in 0usize..=9
    ) {
        let critical = battery_codes(Severity::Critical)[..n_crit].to_vec();
        let high = battery_codes(Severity::High)[..n_high].to_vec();
        let medium = battery_codes(Severity::Medium)[..n_med].to_vec();
        let low = battery_codes(Severity::Low)[..n_low].to_vec();

        let first = derive_score(&critical, &high, &medium, &low);
        let second = derive_score(&critical, &high, &medium, &low);
        prop_assert_eq!(first, second);
        prop_assert!(first <= 100);

        // All checks failing bottoms out at zero.
        if n_crit == 14 && n_high == 15 && n_med == 17 && n_low == 9 {
            prop_assert_eq!(first, 0);
        }
    }

    #[test]
    fn one_more_critical_issue_never_improves_the_tier(
        n_crit in 0usize..14,
        n_high in 0usize..=15,
        n_med in 0usize..=17
    ) {
        let criticals = battery_codes(Severity::Critical);
        let high = battery_codes(Severity::High)[..n_high].to_vec();
        let medium = battery_codes(Severity::Medium)[..n_med].to_vec();

        let before = derive_tier(&criticals[..n_crit], &high, &medium, &[]);
        let after = derive_tier(&criticals[..n_crit + 1], &high, &medium, &[]);
        // Tier1 is numerically lowest; adding severity can only move toward it.
        prop_assert!(after.number() <= before.number());
    }

    #[test]
    fn priority_is_monotonic_in_the_lead_score(score in 0u8..=99) {
        let rank = |p: Priority| match p {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        };
        prop_assert!(
            rank(priority_for_score(score + 1)) >= rank(priority_for_score(score))
        );
    }
}

#[test]
fn short_circuit_always_wins_over_a_clean_battery() {
    for code in [
        IssueCode::InvalidUrl,
        IssueCode::NoWebsiteOrBroken,
        IssueCode::HttpError(503),
        IssueCode::ParseError,
        IssueCode::PlaceholderPage,
    ] {
        assert!(code.is_fatal());
        assert_eq!(derive_tier(&[code], &[], &[], &[]), Tier::Tier1);
        assert_eq!(derive_score(&[code], &[], &[], &[]), 0);
    }
}
