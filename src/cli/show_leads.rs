use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::analysis::Tier;
use crate::cli::cli::CliApp;
use crate::models::Result;
use crate::store;

impl CliApp {
    /// List the best not-yet-contacted leads in a tier.
    pub async fn show_leads(&self) -> Result<()> {
        let tiers = ["TIER_1", "TIER_2", "TIER_3", "TIER_4"];
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Tier")
            .default(0)
            .items(&tiers)
            .interact()?;
        let tier = Tier::from_number(selection as i64 + 1).expect("menu index is 1..=4");

        let limit: usize = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many leads")
            .default(20)
            .interact_text()?;

        let leads = store::list_by_tier(&self.db_pool, tier, limit).await?;
        if leads.is_empty() {
            println!("No open leads in {}.", tier.label());
            return Ok(());
        }

        println!("\n🎯 Top {} leads ({} shown)", tier.label(), leads.len());
        for lead in leads {
            println!(
                "  [{:>3}] {} — {} {} ({})",
                lead.lead_score,
                lead.name,
                lead.address,
                lead.website.as_deref().unwrap_or("<no website>"),
                lead.priority
            );
        }
        Ok(())
    }
}
