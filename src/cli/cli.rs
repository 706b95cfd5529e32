use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::models::{ProviderTag, Result};
use crate::providers::{build_providers, UsageTracker};
use crate::store::DbPool;

#[derive(Debug, Clone)]
pub enum MenuAction {
    DiscoverySweep,
    AnalyzeBusinesses,
    ShowLeads,
    ShowStats,
    TestProviders,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::DiscoverySweep => {
                write!(f, "🔍 Run discovery sweep (search all providers)")
            }
            MenuAction::AnalyzeBusinesses => {
                write!(f, "🧪 Analyze stored business websites")
            }
            MenuAction::ShowLeads => write!(f, "🎯 Show top leads by tier"),
            MenuAction::ShowStats => write!(f, "📊 Show database statistics"),
            MenuAction::TestProviders => write!(f, "📡 Test provider credentials"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

pub struct CliApp {
    pub config: Config,
    pub db_pool: DbPool,
    pub aggregator: Aggregator,
}

impl CliApp {
    pub async fn new(config: Config, db_pool: DbPool) -> Result<Self> {
        let providers = build_providers(&config.providers)?;
        let usage = UsageTracker::new([
            (
                ProviderTag::Foursquare,
                config.providers.foursquare.daily_limit,
            ),
            (ProviderTag::TomTom, config.providers.tomtom.daily_limit),
            (ProviderTag::Yelp, config.providers.yelp.daily_limit),
        ]);
        let aggregator = Aggregator::new(providers, usage);
        Ok(Self {
            config,
            db_pool,
            aggregator,
        })
    }
}
