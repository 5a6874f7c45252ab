// Common types shared across the application

pub mod participant_id;

pub use participant_id::ParticipantId;
