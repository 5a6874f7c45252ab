//! Affinity oracle: asks an LLM to pair participants by compatibility.
//!
//! Best effort only. Every way this can go wrong comes back as an
//! [`OracleError`] and the engine falls back to random pairing; the oracle
//! never hands back a partial or unchecked pairing.

use std::sync::Arc;
use std::time::Duration;

use openai_client::{strip_code_blocks, truncate_to_char_boundary, OpenAIError, StructuredOutput};
use schemars::JsonSchema;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::common::ParticipantId;
use crate::domains::matching::models::{Group, PairingResult, PairingViolation};
use crate::domains::participant::Participant;
use crate::kernel::BaseAI;

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Self-introductions beyond this are cut before prompting
const MAX_BIO_BYTES: usize = 600;

const SCHEMA_NAME: &str = "pairing_proposal";

const SYSTEM_PROMPT: &str = "You organise one-on-one coffee chats between colleagues. \
You receive a list of participants, each with an id, an optional personality type \
(usually an MBTI code) and an optional self-introduction.

Split the participants into pairs who are likely to enjoy talking to each other: \
shared interests, complementary personalities, or something one can learn from the other.

Rules:
- Use every id exactly once, copied exactly as given.
- Every group has exactly two members, except when the number of participants is odd: \
then exactly one group has a single member.
- Never invent ids.
- For each pair, give a one-sentence reason addressed to the two people. \
For a single-member group, reason is null.";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("affinity oracle is not configured")]
    Unavailable,

    #[error("no participants to pair")]
    NoParticipants,

    #[error("oracle request failed: {0}")]
    Transport(String),

    #[error("oracle timed out: {0}")]
    Timeout(String),

    #[error("oracle response was malformed: {0}")]
    Malformed(String),

    #[error("oracle pairing is invalid: {0}")]
    Invalid(#[from] PairingViolation),
}

/// Shape the model is asked to produce
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OracleProposal {
    pub groups: Vec<ProposedGroup>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProposedGroup {
    /// One or two participant ids
    pub members: Vec<String>,
    pub reason: Option<String>,
}

/// Adapter around an optional LLM client
#[derive(Clone)]
pub struct AffinityOracle {
    ai: Option<Arc<dyn BaseAI>>,
    timeout: Duration,
}

impl AffinityOracle {
    pub fn new(ai: Arc<dyn BaseAI>) -> Self {
        Self {
            ai: Some(ai),
            timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    /// No credential: every proposal is `Unavailable`
    pub fn unconfigured() -> Self {
        Self {
            ai: None,
            timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.ai.is_some()
    }

    /// Ask the oracle for a pairing covering every participant exactly once
    #[instrument(skip_all, fields(participants = participants.len()))]
    pub async fn propose(&self, participants: &[Participant]) -> Result<PairingResult, OracleError> {
        let ai = self.ai.as_ref().ok_or(OracleError::Unavailable)?;
        if participants.is_empty() {
            return Err(OracleError::NoParticipants);
        }

        let user_prompt = describe_participants(participants);
        debug!(prompt_bytes = user_prompt.len(), "Requesting pairing from oracle");

        let call = ai.generate_structured(
            SYSTEM_PROMPT,
            &user_prompt,
            SCHEMA_NAME,
            OracleProposal::openai_schema(),
        );

        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(classify(e)),
            Err(_) => {
                return Err(OracleError::Timeout(format!(
                    "no answer within {}s",
                    self.timeout.as_secs_f32()
                )))
            }
        };

        let expected: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
        let pairing = parse_proposal(&raw, &expected)?;

        info!(
            pairs = pairing.pair_count(),
            singletons = pairing.singleton_count(),
            "Oracle proposed a valid pairing"
        );
        Ok(pairing)
    }
}

/// Natural-language roster handed to the model
pub fn describe_participants(participants: &[Participant]) -> String {
    let mut prompt = format!(
        "There are {} participants this round.\n\n",
        participants.len()
    );

    for participant in participants {
        let traits = participant
            .traits
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("not provided");
        let flattened = participant
            .bio
            .as_deref()
            .map(|b| b.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|b| !b.is_empty());
        let bio = match &flattened {
            Some(text) => truncate_to_char_boundary(text, MAX_BIO_BYTES),
            None => "not provided",
        };

        prompt.push_str(&format!(
            "- id: {}\n  type: {}\n  introduction: {}\n",
            participant.id, traits, bio
        ));
    }

    prompt
}

/// Parse and check the model's JSON against the ids that were sent
pub fn parse_proposal(raw: &str, expected: &[ParticipantId]) -> Result<PairingResult, OracleError> {
    let proposal: OracleProposal = serde_json::from_str(strip_code_blocks(raw))
        .map_err(|e| OracleError::Malformed(e.to_string()))?;

    let mut groups = Vec::with_capacity(proposal.groups.len());
    for group in proposal.groups {
        let reason = group
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let mut members: Vec<ParticipantId> = group
            .members
            .iter()
            .map(|m| ParticipantId::from(m.trim()))
            .collect();

        let built = match members.len() {
            1 => Group::Singleton {
                id: members.remove(0),
            },
            2 => {
                let b = members.remove(1);
                let a = members.remove(0);
                Group::Pair { a, b, reason }
            }
            n => return Err(PairingViolation::GroupSize(n).into()),
        };
        groups.push(built);
    }

    let pairing = PairingResult::new(groups);
    pairing.validate_against(expected)?;
    Ok(pairing)
}

fn classify(err: anyhow::Error) -> OracleError {
    match err.downcast_ref::<OpenAIError>() {
        Some(OpenAIError::Timeout(msg)) => OracleError::Timeout(msg.clone()),
        Some(OpenAIError::Parse(msg)) => OracleError::Malformed(msg.clone()),
        _ => OracleError::Transport(format!("{:#}", err)),
    }
}
