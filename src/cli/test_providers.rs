use crate::cli::cli::CliApp;
use crate::models::Result;

impl CliApp {
    /// Probe every configured provider with a one-result search and report
    /// credential health. Auth failures disable the provider for this run.
    pub async fn test_providers(&mut self) -> Result<()> {
        println!("\n📡 Testing provider credentials...");
        let outcomes = self.aggregator.verify_all_credentials().await;
        if outcomes.is_empty() {
            println!("⚠ No providers configured; add API keys to config.yml or .env");
            return Ok(());
        }
        for (tag, outcome) in outcomes {
            match outcome {
                Ok(()) => println!("  ✅ {}: connected", tag),
                Err(msg) => println!("  ❌ {}: {}", tag, msg),
            }
        }
        let disabled = self.aggregator.disabled_providers();
        if !disabled.is_empty() {
            println!(
                "  ⚠ Disabled for this run: {}",
                disabled
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(())
    }
}
