use chrono::Utc;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::warn;
use uuid::Uuid;

use crate::cli::cli::CliApp;
use crate::errors::SearchError;
use crate::models::{CategoryHint, Result};
use crate::store;

impl CliApp {
    /// Search providers for one location/category and persist the
    /// deduplicated candidates.
    pub async fn run_sweep(&mut self) -> Result<()> {
        let location: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Location (e.g. London)")
            .interact_text()?;

        let category_labels: Vec<&str> =
            CategoryHint::ALL.iter().map(|c| c.as_str()).collect();
        let category_idx = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Category")
            .default(0)
            .items(&category_labels)
            .interact()?;
        let category = CategoryHint::ALL[category_idx];

        let radius_m: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Radius in meters")
            .default(self.config.providers.default_radius_m)
            .interact_text()?;

        let policies = ["Search all providers (complete)", "Stop at 10 results (fast)"];
        let policy = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Search policy")
            .default(0)
            .items(&policies)
            .interact()?;

        let started_at = Utc::now().to_rfc3339();
        let report = if policy == 0 {
            self.aggregator
                .search_all_providers(&location, category, radius_m)
                .await
        } else {
            self.aggregator
                .search_until_target(&location, category, radius_m)
                .await
        };

        let report = match report {
            Ok(report) => report,
            Err(SearchError::UnknownLocation(name)) => {
                println!("⚠ '{}' is not in the city table; try one of the major cities.", name);
                return Ok(());
            }
        };

        let mut inserted = 0;
        let mut updated = 0;
        for candidate in &report.candidates {
            match store::upsert_candidate(&self.db_pool, candidate).await {
                Ok(true) => inserted += 1,
                Ok(false) => updated += 1,
                Err(e) => warn!("failed to persist '{}': {}", candidate.name, e),
            }
        }

        store::record_sweep(
            &self.db_pool,
            &store::SweepRecord {
                id: Uuid::new_v4().to_string(),
                location: location.clone(),
                category: category.as_str().to_string(),
                radius_m,
                candidates_found: report.candidates.len(),
                duplicates_removed: report.duplicates_removed,
                no_results: report.no_results,
                started_at,
                finished_at: Utc::now().to_rfc3339(),
            },
        )
        .await?;

        if report.no_results {
            println!(
                "❌ No results from any provider (tried {}).",
                report
                    .providers_tried
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        } else {
            println!(
                "✅ {} unique businesses ({} duplicates removed): {} new, {} updated",
                report.candidates.len(),
                report.duplicates_removed,
                inserted,
                updated
            );
        }
        Ok(())
    }
}
