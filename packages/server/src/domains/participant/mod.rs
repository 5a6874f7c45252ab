//! Participant domain: profiles and round eligibility.

pub mod error;
pub mod models;
pub mod store;

pub use error::ParticipantError;
pub use models::Participant;
pub use store::PostgresParticipantStore;
