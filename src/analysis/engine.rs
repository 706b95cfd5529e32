use tracing::{debug, info};

use super::checks::CheckContext;
use super::page::{FetchOutcome, PageProbe, SiteFetcher};
use super::types::{AnalysisResult, IssueCode, WebsiteStatus};
use crate::config::AnalysisConfig;

/// Fetches a candidate's website and runs the full capability battery.
/// Site-level failures fold into the result (Tier1 with a failure code);
/// nothing here raises to the caller.
pub struct ScoringEngine {
    fetcher: SiteFetcher,
}

impl ScoringEngine {
    pub fn new(cfg: &AnalysisConfig) -> crate::models::Result<Self> {
        Ok(Self {
            fetcher: SiteFetcher::new(cfg)?,
        })
    }

    pub async fn score_website(&self, raw_url: &str) -> AnalysisResult {
        let result = match self.fetcher.fetch(raw_url).await {
            FetchOutcome::InvalidUrl => AnalysisResult::short_circuit(
                raw_url.to_string(),
                WebsiteStatus::InvalidUrl,
                IssueCode::InvalidUrl,
            ),
            FetchOutcome::Unreachable(reason) => {
                debug!("{}: unreachable ({})", raw_url, reason);
                AnalysisResult::short_circuit(
                    raw_url.to_string(),
                    WebsiteStatus::Unreachable,
                    IssueCode::NoWebsiteOrBroken,
                )
            }
            FetchOutcome::HttpError(code) => AnalysisResult::short_circuit(
                raw_url.to_string(),
                WebsiteStatus::HttpError(code),
                IssueCode::HttpError(code),
            ),
            FetchOutcome::Unparseable(reason) => {
                debug!("{}: body could not be decoded ({})", raw_url, reason);
                AnalysisResult::short_circuit(
                    raw_url.to_string(),
                    WebsiteStatus::Accessible,
                    IssueCode::ParseError,
                )
            }
            FetchOutcome::Fetched(probe) => evaluate_probe(&probe),
        };

        info!(
            "scored {}: {} ({}), score {}, {}/{}/{}/{} issues",
            result.url,
            result.tier.label(),
            result.status.as_str(),
            result.total_score,
            result.critical.len(),
            result.high.len(),
            result.medium.len(),
            result.low.len()
        );
        result
    }
}

/// The synchronous half of scoring: run every check over an already
/// fetched probe. Re-running this on an unchanged probe yields an
/// identical result.
pub fn evaluate_probe(probe: &PageProbe) -> AnalysisResult {
    let ctx = CheckContext::new(probe);

    if ctx.is_placeholder() {
        return AnalysisResult::short_circuit(
            probe.url.clone(),
            WebsiteStatus::Accessible,
            IssueCode::PlaceholderPage,
        );
    }

    let report = ctx.run_battery();
    AnalysisResult::from_issues(
        probe.url.clone(),
        WebsiteStatus::Accessible,
        report.critical,
        report.high,
        report.medium,
        report.low,
    )
}
