use dialoguer::{theme::ColorfulTheme, Select};
use tracing::error;

use crate::cli::cli::{CliApp, MenuAction};
use crate::models::Result;

impl CliApp {
    pub async fn run(&mut self) -> Result<()> {
        println!("\n🚀 Welcome to Lead Prospector!");
        println!("═══════════════════════════════════════");

        self.show_database_stats().await?;

        loop {
            let actions = vec![
                MenuAction::DiscoverySweep,
                MenuAction::AnalyzeBusinesses,
                MenuAction::ShowLeads,
                MenuAction::ShowStats,
                MenuAction::TestProviders,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::DiscoverySweep => {
                    if let Err(e) = self.run_sweep().await {
                        error!("Discovery sweep failed: {}", e);
                    }
                }
                MenuAction::AnalyzeBusinesses => {
                    if let Err(e) = self.run_analysis().await {
                        error!("Analysis failed: {}", e);
                    }
                }
                MenuAction::ShowLeads => {
                    if let Err(e) = self.show_leads().await {
                        error!("Lead listing failed: {}", e);
                    }
                }
                MenuAction::ShowStats => {
                    if let Err(e) = self.show_database_stats().await {
                        error!("Stats failed: {}", e);
                    }
                }
                MenuAction::TestProviders => {
                    if let Err(e) = self.test_providers().await {
                        error!("Provider test failed: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("👋 Goodbye!");
                    return Ok(());
                }
            }
        }
    }
}
