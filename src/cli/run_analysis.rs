use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::warn;

use crate::analysis::{LegacyAnalyzer, ScoringEngine};
use crate::cli::cli::CliApp;
use crate::leads::{
    AnalysisPayload, ComprehensiveStrategy, LegacyStrategy, ScoringStrategy,
};
use crate::models::Result;
use crate::store;

impl CliApp {
    /// Score stored businesses that have a website but no analysis yet,
    /// with an explicitly chosen strategy.
    pub async fn run_analysis(&mut self) -> Result<()> {
        let strategies = ["comprehensive (capability battery)", "legacy (single pass)"];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Scoring strategy")
            .default(0)
            .items(&strategies)
            .interact()?;

        let strategy: Box<dyn ScoringStrategy> = if choice == 0 {
            Box::new(ComprehensiveStrategy::new(ScoringEngine::new(
                &self.config.analysis,
            )?))
        } else {
            Box::new(LegacyStrategy::new(LegacyAnalyzer::new(
                &self.config.analysis,
            )?))
        };

        let limit: usize = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many businesses to analyze")
            .default(25)
            .interact_text()?;

        let pending = store::list_pending_analysis(&self.db_pool, limit).await?;
        if pending.is_empty() {
            println!("Nothing to analyze; every stored website already has a result.");
            return Ok(());
        }
        println!(
            "Analyzing {} website(s) with the {} strategy...",
            pending.len(),
            strategy.name()
        );

        let mut scored = 0;
        for business in pending {
            let Some(website) = business.website.as_deref() else {
                continue;
            };
            let evaluation = strategy.evaluate(website).await;
            let outcome = match evaluation.payload {
                AnalysisPayload::Comprehensive(analysis) => {
                    let tier = analysis.tier.label().to_string();
                    store::update_analysis(
                        &self.db_pool,
                        &business.identity_key,
                        &analysis,
                        &evaluation.lead,
                    )
                    .await
                    .map(|_| tier)
                }
                AnalysisPayload::Legacy(snapshot) => store::update_legacy_analysis(
                    &self.db_pool,
                    &business.identity_key,
                    &snapshot,
                    &evaluation.lead,
                )
                .await
                .map(|_| format!("score {}", snapshot.score)),
            };

            match outcome {
                Ok(label) => {
                    scored += 1;
                    println!(
                        "  {} → {} (lead {} / {})",
                        business.name,
                        label,
                        evaluation.lead.score,
                        evaluation.lead.priority.as_str()
                    );
                }
                Err(e) => warn!("failed to store analysis for '{}': {}", business.name, e),
            }
        }

        println!("✅ Stored analysis for {} business(es)", scored);
        Ok(())
    }
}
