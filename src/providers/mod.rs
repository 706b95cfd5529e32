use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::config::ProvidersConfig;
use crate::errors::ProviderError;
use crate::models::{BusinessCandidate, CategoryHint, Coordinate, ProviderTag};

mod foursquare;
mod tomtom;
mod usage;
mod yelp;

pub use foursquare::FoursquareProvider;
pub use tomtom::TomTomProvider;
pub use usage::{UsageSnapshot, UsageTracker};
pub use yelp::YelpProvider;

/// One external place-data source. Adapters translate their provider's
/// schema into `BusinessCandidate` and share nothing else.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    fn tag(&self) -> ProviderTag;

    /// Empty results are `Ok(vec![])`, never an error. `AuthFailure` means
    /// the provider rejected the credential; everything else network-ish is
    /// `Unavailable`.
    async fn search(
        &self,
        coord: Coordinate,
        category: CategoryHint,
        radius_m: u32,
    ) -> Result<Vec<BusinessCandidate>, ProviderError>;

    /// Minimal one-result probe classifying credential health with the
    /// same error taxonomy as `search`.
    async fn verify_credentials(&self) -> Result<(), ProviderError>;
}

/// Build the adapter roster in fixed priority order (most reliable and
/// highest-coverage first). Providers without a resolvable credential are
/// left out of the roster entirely.
pub fn build_providers(
    cfg: &ProvidersConfig,
) -> crate::models::Result<Vec<Box<dyn PlaceProvider>>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.search_timeout_seconds))
        .build()?;

    let mut providers: Vec<Box<dyn PlaceProvider>> = Vec::new();

    if cfg.tomtom.enabled {
        match cfg.tomtom.resolved_key("TOMTOM_API_KEY") {
            Some(key) => providers.push(Box::new(TomTomProvider::new(client.clone(), key))),
            None => warn!("tomtom: no API key configured, provider skipped"),
        }
    }
    if cfg.foursquare.enabled {
        match cfg.foursquare.resolved_key("FOURSQUARE_API_KEY") {
            Some(key) => providers.push(Box::new(FoursquareProvider::new(client.clone(), key))),
            None => warn!("foursquare: no API key configured, provider skipped"),
        }
    }
    if cfg.yelp.enabled {
        match cfg.yelp.resolved_key("YELP_API_KEY") {
            Some(key) => providers.push(Box::new(YelpProvider::new(client.clone(), key))),
            None => warn!("yelp: no API key configured, provider skipped"),
        }
    }

    Ok(providers)
}
