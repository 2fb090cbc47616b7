pub mod freshness;
pub mod orchestrator;

pub use orchestrator::SyncOrchestrator;
