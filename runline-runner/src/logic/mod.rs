pub mod reports;
pub mod runner;
pub mod seeds;

pub use reports::RunReport;
pub use runner::{FileRosterSource, RunPlan, SeedRun, run_seeds};
pub use seeds::resolve_seed_inputs;
