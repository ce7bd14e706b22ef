pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::GameplayStrategy;
pub use reports::aggregate_runs;
pub use seeds::resolve_seed_inputs;
pub use simulation::{RunRecord, SimulationConfig, run_simulation};
