pub mod cli;
pub mod run;
pub mod run_analysis;
pub mod run_sweep;
pub mod show_leads;
pub mod show_stats;
pub mod test_providers;

pub use cli::CliApp;
