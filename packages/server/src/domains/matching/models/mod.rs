pub mod pairing;

pub use pairing::{Group, PairingResult, PairingViolation};
