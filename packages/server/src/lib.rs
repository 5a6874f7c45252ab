// Coffee Chat Matcher - API Core
//
// Pairs opted-in colleagues for one-on-one coffee chats on a schedule.
// Affinity pairing comes from an LLM when configured, with random pairing as
// the fallback; results are delivered as Slack direct messages.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
