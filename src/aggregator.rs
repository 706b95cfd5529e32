use std::collections::{HashSet, VecDeque};

use tracing::{info, warn};

use crate::errors::{ProviderError, SearchError};
use crate::geo;
use crate::models::{BusinessCandidate, CategoryHint, Coordinate, ProviderTag};
use crate::providers::{PlaceProvider, UsageTracker};

/// Result-count threshold at which `search_until_target` stops fanning out.
pub const TARGET_RESULTS: usize = 10;

/// Outcome of one multi-provider search. "No results from any provider" is
/// a reported condition here, not an error, so batch runs keep going.
#[derive(Debug)]
pub struct SearchReport {
    pub candidates: Vec<BusinessCandidate>,
    pub duplicates_removed: usize,
    pub providers_tried: Vec<ProviderTag>,
    pub providers_failed: Vec<ProviderTag>,
    pub no_results: bool,
}

/// Fans a geographic query out across the configured adapters in fixed
/// priority order, deduplicating the union.
pub struct Aggregator {
    providers: Vec<Box<dyn PlaceProvider>>,
    usage: UsageTracker,
    disabled: HashSet<ProviderTag>,
}

impl Aggregator {
    pub fn new(providers: Vec<Box<dyn PlaceProvider>>, usage: UsageTracker) -> Self {
        Self {
            providers,
            usage,
            disabled: HashSet::new(),
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Providers disabled by an auth failure during this run.
    pub fn disabled_providers(&self) -> Vec<ProviderTag> {
        let mut tags: Vec<ProviderTag> = self.disabled.iter().copied().collect();
        tags.sort_by_key(|tag| tag.as_str());
        tags
    }

    /// Query every adapter regardless of earlier successes, for maximum
    /// coverage.
    pub async fn search_all_providers(
        &mut self,
        location: &str,
        category: CategoryHint,
        radius_m: u32,
    ) -> Result<SearchReport, SearchError> {
        let coord = self.resolve(location)?;
        Ok(self.fan_out(coord, category, radius_m, None).await)
    }

    /// Query adapters in priority order, stopping once `TARGET_RESULTS`
    /// candidates have accumulated (speed over completeness).
    pub async fn search_until_target(
        &mut self,
        location: &str,
        category: CategoryHint,
        radius_m: u32,
    ) -> Result<SearchReport, SearchError> {
        let coord = self.resolve(location)?;
        Ok(self
            .fan_out(coord, category, radius_m, Some(TARGET_RESULTS))
            .await)
    }

    /// Run every enabled provider's credential probe, returning per-provider
    /// outcomes. An auth failure here disables the provider like one seen
    /// during a search.
    pub async fn verify_all_credentials(&mut self) -> Vec<(ProviderTag, Result<(), String>)> {
        let mut outcomes = Vec::with_capacity(self.providers.len());
        for i in 0..self.providers.len() {
            let tag = self.providers[i].tag();
            let outcome = self.providers[i].verify_credentials().await;
            let result = match outcome {
                Ok(()) => Ok(()),
                Err(ProviderError::AuthFailure(msg)) => {
                    self.disabled.insert(tag);
                    Err(msg)
                }
                Err(ProviderError::Unavailable(msg)) => Err(msg),
            };
            outcomes.push((tag, result));
        }
        outcomes
    }

    fn resolve(&self, location: &str) -> Result<Coordinate, SearchError> {
        let coord = geo::lookup_city(location)
            .ok_or_else(|| SearchError::UnknownLocation(location.to_string()))?;
        info!(
            "resolved '{}' to coordinates {:.4}, {:.4}",
            location, coord.lat, coord.lng
        );
        Ok(coord)
    }

    async fn fan_out(
        &mut self,
        coord: Coordinate,
        category: CategoryHint,
        radius_m: u32,
        target: Option<usize>,
    ) -> SearchReport {
        let mut collected: Vec<BusinessCandidate> = Vec::new();
        let mut tried = Vec::new();
        let mut failed = Vec::new();

        for i in 0..self.providers.len() {
            let tag = self.providers[i].tag();
            if self.disabled.contains(&tag) {
                continue;
            }
            if self.usage.exhausted(tag) {
                warn!("{}: daily limit reached, skipping", tag);
                failed.push(tag);
                continue;
            }

            tried.push(tag);
            self.usage.record(tag);

            let outcome = self.providers[i].search(coord, category, radius_m).await;
            match outcome {
                Ok(results) if results.is_empty() => {
                    info!("{}: no results", tag);
                }
                Ok(results) => {
                    info!("{}: found {} businesses", tag, results.len());
                    collected.extend(results);
                }
                Err(ProviderError::AuthFailure(msg)) => {
                    warn!("{}: credential rejected ({}), disabled for this run", tag, msg);
                    self.disabled.insert(tag);
                    failed.push(tag);
                }
                Err(ProviderError::Unavailable(msg)) => {
                    warn!("{}: unavailable ({}), will retry next sweep", tag, msg);
                    failed.push(tag);
                }
            }

            if let Some(target) = target {
                if collected.len() >= target {
                    break;
                }
            }
        }

        let no_results = collected.is_empty();
        if no_results {
            warn!(
                "no results from any provider (tried: {})",
                tried
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let (candidates, duplicates_removed) = dedupe(collected);
        if duplicates_removed > 0 {
            info!(
                "removed {} duplicate(s), {} unique businesses remain",
                duplicates_removed,
                candidates.len()
            );
        }

        SearchReport {
            candidates,
            duplicates_removed,
            providers_tried: tried,
            providers_failed: failed,
            no_results,
        }
    }
}

/// First-seen candidate per normalized `name_address` key wins.
pub fn dedupe(results: Vec<BusinessCandidate>) -> (Vec<BusinessCandidate>, usize) {
    let total = results.len();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<BusinessCandidate> = results.into();
    let mut unique = Vec::with_capacity(queue.len());

    while let Some(candidate) = queue.pop_front() {
        if seen.insert(candidate.join_key()) {
            unique.push(candidate);
        }
    }

    let removed = total - unique.len();
    (unique, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderTag;

    fn candidate(name: &str, address: &str) -> BusinessCandidate {
        BusinessCandidate {
            external_id: format!("{}-{}", name, address),
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

    #[test]
    fn dedupe_is_case_and_whitespace_insensitive() {
        let (unique, removed) = dedupe(vec![
            candidate("Blue Cup Cafe", "12 Main St"),
            candidate("BLUE CUP  CAFE", "12 main st"),
            candidate("Red Fork Diner", "99 Oak Ave"),
        ]);
        assert_eq!(unique.len(), 2);
        assert_eq!(removed, 1);
        // First-seen candidate kept its original casing.
        assert_eq!(unique[0].name, "Blue Cup Cafe");
    }

    #[test]
    fn dedupe_keeps_everything_when_keys_differ() {
        let (unique, removed) = dedupe(vec![
            candidate("Blue Cup Cafe", "12 Main St"),
            candidate("Blue Cup Cafe", "14 Main St"),
        ]);
        assert_eq!(unique.len(), 2);
        assert_eq!(removed, 0);
    }
}
