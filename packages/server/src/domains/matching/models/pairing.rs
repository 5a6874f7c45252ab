use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::common::ParticipantId;

/// One group in a pairing: two people who meet, or the odd one out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Group {
    Pair {
        a: ParticipantId,
        b: ParticipantId,
        /// Short explanation from the affinity oracle, if it gave one
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Singleton {
        id: ParticipantId,
    },
}

impl Group {
    pub fn pair(a: ParticipantId, b: ParticipantId) -> Self {
        Self::Pair { a, b, reason: None }
    }

    pub fn members(&self) -> Vec<&ParticipantId> {
        match self {
            Self::Pair { a, b, .. } => vec![a, b],
            Self::Singleton { id } => vec![id],
        }
    }
}

/// Why a pairing does not partition the expected id set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingViolation {
    #[error("participant {0} appears in more than one group")]
    Duplicate(ParticipantId),

    #[error("participant {0} was not in this round")]
    Unknown(ParticipantId),

    #[error("participant {0} was left out")]
    Missing(ParticipantId),

    #[error("group of size {0}; groups must have one or two members")]
    GroupSize(usize),

    #[error("{0} singletons; at most one is allowed")]
    TooManySingletons(usize),
}

/// Transient output of one matching attempt
///
/// Lives for a single run: built, dispatched, dropped. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairingResult {
    groups: Vec<Group>,
}

impl PairingResult {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g, Group::Pair { .. }))
            .count()
    }

    pub fn singleton_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g, Group::Singleton { .. }))
            .count()
    }

    pub fn participant_count(&self) -> usize {
        self.pair_count() * 2 + self.singleton_count()
    }

    /// Every id across all groups, in group order
    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.groups.iter().flat_map(Group::members)
    }

    /// Check this pairing is a partition of exactly `expected`
    ///
    /// Each expected id in exactly one group, nothing invented, at most one
    /// singleton. Pairs of the same id twice count as a duplicate.
    pub fn validate_against(&self, expected: &[ParticipantId]) -> Result<(), PairingViolation> {
        let expected: HashSet<&ParticipantId> = expected.iter().collect();
        let mut seen: HashSet<&ParticipantId> = HashSet::with_capacity(expected.len());

        for id in self.ids() {
            if !expected.contains(id) {
                return Err(PairingViolation::Unknown(id.clone()));
            }
            if !seen.insert(id) {
                return Err(PairingViolation::Duplicate(id.clone()));
            }
        }

        if let Some(missing) = expected.iter().find(|id| !seen.contains(*id)) {
            return Err(PairingViolation::Missing((*missing).clone()));
        }

        let singletons = self.singleton_count();
        if singletons > 1 {
            return Err(PairingViolation::TooManySingletons(singletons));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ParticipantId> {
        raw.iter().map(|s| ParticipantId::from(*s)).collect()
    }

    fn pair(a: &str, b: &str) -> Group {
        Group::pair(a.into(), b.into())
    }

    fn solo(id: &str) -> Group {
        Group::Singleton { id: id.into() }
    }

    #[test]
    fn test_counts() {
        let result = PairingResult::new(vec![pair("A", "B"), pair("C", "D"), solo("E")]);

        assert_eq!(result.pair_count(), 2);
        assert_eq!(result.singleton_count(), 1);
        assert_eq!(result.participant_count(), 5);
        assert_eq!(result.ids().count(), 5);
    }

    #[test]
    fn test_valid_partition_passes() {
        let result = PairingResult::new(vec![pair("B", "C"), solo("A")]);
        assert_eq!(result.validate_against(&ids(&["A", "B", "C"])), Ok(()));
    }

    #[test]
    fn test_missing_id_rejected() {
        let result = PairingResult::new(vec![pair("A", "B")]);
        assert_eq!(
            result.validate_against(&ids(&["A", "B", "C"])),
            Err(PairingViolation::Missing("C".into()))
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = PairingResult::new(vec![pair("A", "B"), pair("B", "C")]);
        assert_eq!(
            result.validate_against(&ids(&["A", "B", "C"])),
            Err(PairingViolation::Duplicate("B".into()))
        );
    }

    #[test]
    fn test_self_pair_rejected() {
        let result = PairingResult::new(vec![pair("A", "A")]);
        assert_eq!(
            result.validate_against(&ids(&["A"])),
            Err(PairingViolation::Duplicate("A".into()))
        );
    }

    #[test]
    fn test_invented_id_rejected() {
        let result = PairingResult::new(vec![pair("A", "Z")]);
        assert_eq!(
            result.validate_against(&ids(&["A", "B"])),
            Err(PairingViolation::Unknown("Z".into()))
        );
    }

    #[test]
    fn test_extra_singletons_rejected() {
        let result = PairingResult::new(vec![solo("A"), solo("B"), solo("C")]);
        assert_eq!(
            result.validate_against(&ids(&["A", "B", "C"])),
            Err(PairingViolation::TooManySingletons(3))
        );
    }

    #[test]
    fn test_empty_against_empty_is_valid() {
        assert_eq!(PairingResult::default().validate_against(&[]), Ok(()));
    }
}
