// TestDependencies - mock implementations for testing
//
// Provides in-memory doubles for every Base* trait so the matching engine
// can be driven end to end without Postgres, OpenAI or Slack.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseAI, BaseNotifier, BaseParticipantStore};
use crate::common::ParticipantId;
use crate::domains::participant::{Participant, ParticipantError};

// =============================================================================
// Mock AI (structured LLM output)
// =============================================================================

enum MockReply {
    Text(String),
    Failure(anyhow::Error),
    Hang,
}

pub struct MockAI {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(MockReply::Text(response.into()));
        self
    }

    /// Add a JSON response to the queue (will be serialized)
    pub fn with_json_response<T: serde::Serialize>(self, data: &T) -> Self {
        let json = serde_json::to_string(data).expect("Failed to serialize mock response");
        self.push(MockReply::Text(json));
        self
    }

    /// Next call fails as if the transport broke
    pub fn with_error(self, message: &str) -> Self {
        self.push(MockReply::Failure(anyhow::anyhow!(message.to_string())));
        self
    }

    /// Next call fails with a specific error (e.g. a client timeout)
    pub fn with_failure<E>(self, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.push(MockReply::Failure(error.into()));
        self
    }

    /// Next call never answers
    pub fn with_hang(self) -> Self {
        self.push(MockReply::Hang);
        self
    }

    /// Check if a prompt containing the given text was sent
    pub fn was_called_with(&self, text: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|p| p.contains(text))
    }

    /// Get the number of times the AI was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _schema_name: &str,
        _schema: serde_json::Value,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}\n\n{}", system_prompt, user_prompt));

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(error)) => Err(error),
            Some(MockReply::Hang) => futures::future::pending().await,
            None => Ok("Mock AI response".to_string()),
        }
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

pub struct MockNotifier {
    sent: Arc<Mutex<Vec<(ParticipantId, String)>>>,
    failing: Arc<Mutex<HashSet<ParticipantId>>>,
    attempts: Arc<Mutex<Vec<ParticipantId>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Deliveries to this recipient will fail
    pub fn failing_for(self, recipient: &str) -> Self {
        self.failing.lock().unwrap().insert(recipient.into());
        self
    }

    /// Successfully delivered (recipient, text) pairs
    pub fn sent(&self) -> Vec<(ParticipantId, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Every recipient a send was attempted for, delivered or not
    pub fn attempts(&self) -> Vec<ParticipantId> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn messages_for(&self, recipient: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to.as_str() == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn send(&self, recipient: &ParticipantId, text: &str) -> Result<()> {
        self.attempts.lock().unwrap().push(recipient.clone());

        if self.failing.lock().unwrap().contains(recipient) {
            anyhow::bail!("channel_not_found: {}", recipient);
        }

        self.sent
            .lock()
            .unwrap()
            .push((recipient.clone(), text.to_string()));
        Ok(())
    }
}

// =============================================================================
// In-memory Participant Store
// =============================================================================

pub struct InMemoryParticipantStore {
    records: Arc<Mutex<BTreeMap<ParticipantId, Participant>>>,
    reset_calls: Arc<Mutex<Vec<Vec<ParticipantId>>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryParticipantStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
            reset_calls: Arc::new(Mutex::new(Vec::new())),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed registered profiles that have opted in
    pub fn with_eligible(self, ids: &[&str]) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            for id in ids {
                let mut participant = Participant::new(*id, None, None);
                participant.eligible = true;
                records.insert(participant.id.clone(), participant);
            }
        }
        self
    }

    /// Seed registered profiles that have not opted in
    pub fn with_registered(self, ids: &[&str]) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            for id in ids {
                let participant = Participant::new(*id, None, None);
                records.insert(participant.id.clone(), participant);
            }
        }
        self
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, id: &str) -> Option<Participant> {
        self.records
            .lock()
            .unwrap()
            .get(&ParticipantId::from(id))
            .cloned()
    }

    pub fn is_eligible(&self, id: &str) -> bool {
        self.get(id).map(|p| p.eligible).unwrap_or(false)
    }

    /// Id sets passed to reset_eligibility, in call order
    pub fn reset_calls(&self) -> Vec<Vec<ParticipantId>> {
        self.reset_calls.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<(), ParticipantError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ParticipantError::Storage("simulated read failure".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), ParticipantError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ParticipantError::Storage("simulated write failure".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryParticipantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseParticipantStore for InMemoryParticipantStore {
    async fn upsert(
        &self,
        id: &ParticipantId,
        traits: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Participant, ParticipantError> {
        self.check_writes()?;

        let mut records = self.records.lock().unwrap();
        let participant = records
            .entry(id.clone())
            .or_insert_with(|| Participant::new(id.clone(), None, None));
        if let Some(traits) = traits {
            participant.traits = Some(traits.to_string());
        }
        if let Some(bio) = bio {
            participant.bio = Some(bio.to_string());
        }
        participant.updated_at = chrono::Utc::now();
        Ok(participant.clone())
    }

    async fn mark_eligible(&self, id: &ParticipantId) -> Result<Participant, ParticipantError> {
        self.check_writes()?;

        let mut records = self.records.lock().unwrap();
        let participant = records
            .get_mut(id)
            .ok_or_else(|| ParticipantError::NotRegistered(id.clone()))?;
        participant.eligible = true;
        Ok(participant.clone())
    }

    async fn list_eligible(&self) -> Result<Vec<Participant>, ParticipantError> {
        self.check_reads()?;

        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.eligible)
            .cloned()
            .collect())
    }

    async fn reset_eligibility(&self, ids: &[ParticipantId]) -> Result<u64, ParticipantError> {
        self.reset_calls.lock().unwrap().push(ids.to_vec());
        self.check_writes()?;

        let mut records = self.records.lock().unwrap();
        let mut touched = 0;
        for id in ids {
            if let Some(participant) = records.get_mut(id) {
                participant.eligible = false;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn find(&self, id: &ParticipantId) -> Result<Option<Participant>, ParticipantError> {
        self.check_reads()?;
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn health_check(&self) -> Result<(), ParticipantError> {
        self.check_reads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_ai_records_both_prompts_and_replies_in_order() {
        let ai = MockAI::new()
            .with_json_response(&serde_json::json!({"groups": []}))
            .with_error("boom");

        let first = ai
            .generate_structured("system text", "user text", "pairing", serde_json::json!({}))
            .await
            .unwrap();
        let second = ai
            .generate_structured("system text", "again", "pairing", serde_json::json!({}))
            .await;
        let third = ai
            .generate_structured("system text", "last", "pairing", serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(first, r#"{"groups":[]}"#);
        assert!(second.is_err());
        assert_eq!(third, "Mock AI response");
        assert_eq!(ai.call_count(), 3);
        assert!(ai.was_called_with("system text\n\nuser text"));
    }
}
