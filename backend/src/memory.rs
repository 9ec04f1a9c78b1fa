use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, MutexGuard,
};
use tokio::sync::broadcast;
use tracing::error;
use uuid::Uuid;
use shared::models::*;
use crate::store::{ChangeTopic, StoreError, Subscription, VoterChange, VoterStore, CHANGE_BUFFER};

/// In-process `VoterStore` for tests and local runs.
///
/// Reads and writes can be made to fail on demand, and every call is
/// counted so callers can assert on the external side effects.
pub struct MemoryVoterStore {
    voters: Mutex<Vec<VoterRecord>>,
    changes: broadcast::Sender<VoterChange>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryVoterStore {
    pub fn new(voters: Vec<VoterRecord>) -> Self {
        Self {
            voters: Mutex::new(voters),
            changes: broadcast::channel(CHANGE_BUFFER).0,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<VoterRecord>>, StoreError> {
        self.voters.lock().map_err(|e| {
            error!("Failed to acquire voter lock: {}", e);
            StoreError::Database("voter table lock poisoned".into())
        })
    }

    fn begin_read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset during read".into()));
        }
        Ok(())
    }

    pub fn insert(&self, voter: VoterRecord) -> Result<(), StoreError> {
        self.lock()?.push(voter);
        Ok(())
    }

    pub fn voter(&self, voter_id: Uuid) -> Option<VoterRecord> {
        self.lock().ok()?.iter().find(|v| v.id == voter_id).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[rocket::async_trait]
impl VoterStore for MemoryVoterStore {
    async fn fetch_all_voters(&self) -> Result<Vec<VoterRecord>, StoreError> {
        self.begin_read()?;
        let mut voters = self.lock()?.clone();
        voters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(voters)
    }

    async fn fetch_voted_choices(&self) -> Result<Vec<VoteChoice>, StoreError> {
        self.begin_read()?;
        Ok(self.lock()?
            .iter()
            .filter(|v| v.voted_for.is_some())
            .map(|v| VoteChoice { voted_for: v.voted_for.clone() })
            .collect())
    }

    async fn fetch_voter_choice(&self, voter_id: Uuid) -> Result<VoteChoice, StoreError> {
        self.begin_read()?;
        self.lock()?
            .iter()
            .find(|v| v.id == voter_id)
            .map(|v| VoteChoice { voted_for: v.voted_for.clone() })
            .ok_or(StoreError::NotFound(voter_id))
    }

    async fn update_voter_choice(&self, voter_id: Uuid, candidate: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset during write".into()));
        }

        {
            let mut voters = self.lock()?;
            let voter = voters.iter_mut()
                .find(|v| v.id == voter_id)
                .ok_or(StoreError::NotFound(voter_id))?;
            voter.voted_for = Some(candidate.to_string());
        }

        let _ = self.changes.send(VoterChange::updated(Some(voter_id)));
        Ok(())
    }

    fn subscribe(&self, topic: ChangeTopic) -> Result<Subscription, StoreError> {
        Ok(Subscription::new(topic, self.changes.subscribe()))
    }
}
