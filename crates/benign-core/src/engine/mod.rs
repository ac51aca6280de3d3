pub mod attempt;
pub mod explain;
pub mod runner;
pub mod sampling;

pub use attempt::{complete_with_retries, CallOutcome, RunAudit};
pub use explain::ExplanationCollector;
pub use runner::{plan_generation, GenerationTask, Runner};
