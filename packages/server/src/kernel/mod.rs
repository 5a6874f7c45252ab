//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod llm_request;
pub mod scheduled_tasks;
pub mod slack;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use llm_request::OpenAiAdapter;
pub use scheduled_tasks::{start_scheduler, MatchingTrigger};
pub use slack::SlackNotifier;
pub use test_dependencies::{InMemoryParticipantStore, MockAI, MockNotifier};
pub use traits::*;
