pub mod checks;
pub mod engine;
pub mod legacy;
pub mod page;
pub mod types;

pub use engine::{evaluate_probe, ScoringEngine};
pub use legacy::{LegacyAnalyzer, LegacySnapshot};
pub use page::{FetchOutcome, PageProbe, SiteFetcher};
pub use types::{
    derive_score, derive_tier, max_possible_points, AnalysisResult, IssueCode, Severity, Tier,
    WebsiteStatus, BATTERY,
};
