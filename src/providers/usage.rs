use std::collections::HashMap;

use crate::models::ProviderTag;

/// Per-provider call counters against daily limits. Owned by the
/// aggregator for the duration of a run; nothing here is ambient state.
#[derive(Debug, Default)]
pub struct UsageTracker {
    counts: HashMap<ProviderTag, u32>,
    limits: HashMap<ProviderTag, u32>,
}

#[derive(Debug, Clone)]
pub struct UsageSnapshot {
    pub provider: ProviderTag,
    pub used: u32,
    pub limit: u32,
}

impl UsageTracker {
    pub fn new(limits: impl IntoIterator<Item = (ProviderTag, u32)>) -> Self {
        Self {
            counts: HashMap::new(),
            limits: limits.into_iter().collect(),
        }
    }

    pub fn record(&mut self, provider: ProviderTag) {
        *self.counts.entry(provider).or_insert(0) += 1;
    }

    /// A provider with no configured limit is never exhausted.
    pub fn exhausted(&self, provider: ProviderTag) -> bool {
        match self.limits.get(&provider) {
            Some(&limit) => self.counts.get(&provider).copied().unwrap_or(0) >= limit,
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<UsageSnapshot> {
        let mut rows: Vec<UsageSnapshot> = self
            .limits
            .iter()
            .map(|(&provider, &limit)| UsageSnapshot {
                provider,
                used: self.counts.get(&provider).copied().unwrap_or(0),
                limit,
            })
            .collect();
        rows.sort_by_key(|row| row.provider.as_str());
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_once_limit_reached() {
        let mut tracker = UsageTracker::new([(ProviderTag::Yelp, 2)]);
        assert!(!tracker.exhausted(ProviderTag::Yelp));
        tracker.record(ProviderTag::Yelp);
        tracker.record(ProviderTag::Yelp);
        assert!(tracker.exhausted(ProviderTag::Yelp));
        // Unknown provider has no limit.
        assert!(!tracker.exhausted(ProviderTag::TomTom));
    }
}
