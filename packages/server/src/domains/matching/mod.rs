pub mod engine;
pub mod fallback;
pub mod messages;
pub mod models;
pub mod oracle;

// Re-export commonly used types
pub use engine::{MatchingEngine, PairingSource, RunOutcome, RunState, RunSummary};
pub use models::{Group, PairingResult, PairingViolation};
pub use oracle::{AffinityOracle, OracleError};
