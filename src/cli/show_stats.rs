use crate::cli::cli::CliApp;
use crate::models::Result;
use crate::store;

impl CliApp {
    pub async fn show_database_stats(&self) -> Result<()> {
        let stats = store::get_statistics(&self.db_pool).await?;

        println!("\n📊 Database statistics");
        println!("  Businesses:             {}", stats.total_businesses);
        println!("  With websites:          {}", stats.with_websites);
        println!("  Analyzed:               {}", stats.analyzed);
        println!("  Capability-scored:      {}", stats.comprehensively_analyzed);
        println!(
            "  Tiers (1/2/3/4):        {} / {} / {} / {}",
            stats.tier_counts[0], stats.tier_counts[1], stats.tier_counts[2], stats.tier_counts[3]
        );
        println!(
            "  Priority (hi/med/low):  {} / {} / {}",
            stats.high_priority, stats.medium_priority, stats.low_priority
        );

        for snapshot in self.aggregator.usage().snapshot() {
            println!(
                "  {} usage:        {}/{}",
                snapshot.provider, snapshot.used, snapshot.limit
            );
        }
        Ok(())
    }
}
