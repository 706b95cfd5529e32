use async_trait::async_trait;
use serde::Serialize;

use crate::analysis::{AnalysisResult, LegacyAnalyzer, LegacySnapshot, ScoringEngine, Tier};

/// Outreach priority bucket derived from a lead score or tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Bounded lead score plus its priority bucket. Recomputed
/// deterministically from an analysis; never hand-edited.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LeadScore {
    pub score: u8,
    pub priority: Priority,
}

/// High >= 70, Medium 40-69, Low < 40.
pub fn priority_for_score(score: u8) -> Priority {
    if score >= 70 {
        Priority::High
    } else if score >= 40 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn priority_for_tier(tier: Tier) -> Priority {
    match tier {
        Tier::Tier1 | Tier::Tier2 => Priority::High,
        Tier::Tier3 => Priority::Medium,
        Tier::Tier4 => Priority::Low,
    }
}

/// Lead score from a capability analysis: fixed penalty per issue,
/// short-circuit failures weigh heaviest. Priority comes from the tier.
pub fn lead_score_comprehensive(analysis: &AnalysisResult) -> LeadScore {
    let mut score: i32 = 100;
    score -= analysis.fatal_count() as i32 * 50;
    score -= analysis.critical_count() as i32 * 10;
    score -= analysis.high.len() as i32 * 5;
    score -= analysis.medium.len() as i32 * 3;
    score -= analysis.low.len() as i32;
    LeadScore {
        score: score.clamp(0, 100) as u8,
        priority: priority_for_tier(analysis.tier),
    }
}

/// Lead score from a legacy snapshot: each missing capability adds pain
/// points, so a worse site is a hotter lead. Priority comes from the score.
pub fn lead_score_legacy(snapshot: &LegacySnapshot) -> LeadScore {
    let mut score: i32 = 0;
    if !snapshot.has_ssl {
        score += 30;
    }
    if !snapshot.mobile_friendly {
        score += 25;
    }
    if snapshot.load_time_s > 5.0 {
        score += 20;
    }
    if snapshot.needs_redesign {
        score += 15;
    }
    if !snapshot.has_contact_form {
        score += 10;
    }
    score += (snapshot.outdated_tech.len() as i32 * 5).min(20);

    let score = score.min(100) as u8;
    LeadScore {
        score,
        priority: priority_for_score(score),
    }
}

/// One scored website, in whichever shape the chosen strategy produces.
#[derive(Debug)]
pub enum AnalysisPayload {
    Comprehensive(AnalysisResult),
    Legacy(LegacySnapshot),
}

#[derive(Debug)]
pub struct LeadEvaluation {
    pub lead: LeadScore,
    pub payload: AnalysisPayload,
}

/// One of the two scoring paths. Callers pick a strategy explicitly; which
/// path ran is never inferred from the shape of stored data.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn evaluate(&self, url: &str) -> LeadEvaluation;
}

pub struct ComprehensiveStrategy {
    engine: ScoringEngine,
}

impl ComprehensiveStrategy {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ScoringStrategy for ComprehensiveStrategy {
    fn name(&self) -> &'static str {
        "comprehensive"
    }

    async fn evaluate(&self, url: &str) -> LeadEvaluation {
        let analysis = self.engine.score_website(url).await;
        LeadEvaluation {
            lead: lead_score_comprehensive(&analysis),
            payload: AnalysisPayload::Comprehensive(analysis),
        }
    }
}

pub struct LegacyStrategy {
    analyzer: LegacyAnalyzer,
}

impl LegacyStrategy {
    pub fn new(analyzer: LegacyAnalyzer) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl ScoringStrategy for LegacyStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn evaluate(&self, url: &str) -> LeadEvaluation {
        let snapshot = self.analyzer.analyze(url).await;
        LeadEvaluation {
            lead: lead_score_legacy(&snapshot),
            payload: AnalysisPayload::Legacy(snapshot),
        }
    }
}
