use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;
use uuid::Uuid;
use shared::models::*;

pub const VOTERS_TABLE: &str = "voters";

/// Capacity of the change fan-out; slow subscribers see a lag instead of blocking writers.
pub const CHANGE_BUFFER: usize = 64;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Data store is not configured")]
    NotConfigured,
    #[error("Voter {0} not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterChange {
    pub table: &'static str,
    pub kind: ChangeKind,
    /// `None` when the notification does not identify a row, e.g. after a lag.
    pub voter_id: Option<Uuid>,
}

impl VoterChange {
    pub fn updated(voter_id: Option<Uuid>) -> Self {
        Self { table: VOTERS_TABLE, kind: ChangeKind::Update, voter_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeTopic {
    pub table: &'static str,
    pub kind: ChangeKind,
}

impl ChangeTopic {
    pub const VOTER_UPDATES: ChangeTopic = ChangeTopic { table: VOTERS_TABLE, kind: ChangeKind::Update };

    pub fn matches(&self, change: &VoterChange) -> bool {
        self.table == change.table && self.kind == change.kind
    }
}

/// A live change stream for one topic. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    topic: ChangeTopic,
    rx: broadcast::Receiver<VoterChange>,
}

impl Subscription {
    pub fn new(topic: ChangeTopic, rx: broadcast::Receiver<VoterChange>) -> Self {
        Self { topic, rx }
    }

    pub fn topic(&self) -> ChangeTopic { self.topic }

    /// Waits for the next change on this topic; `None` once the store stops publishing.
    /// Missed notifications collapse into a single anonymous change.
    pub async fn next_change(&mut self) -> Option<VoterChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if self.topic.matches(&change) => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Subscription lagged by {} changes", skipped);
                    return Some(VoterChange {
                        table: self.topic.table,
                        kind: self.topic.kind,
                        voter_id: None,
                    });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// The external data service the voting and admin views run on.
#[rocket::async_trait]
pub trait VoterStore: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    /// Every voter, newest registration first.
    async fn fetch_all_voters(&self) -> Result<Vec<VoterRecord>, StoreError>;

    /// Only rows whose `voted_for` is set.
    async fn fetch_voted_choices(&self) -> Result<Vec<VoteChoice>, StoreError>;

    async fn fetch_voter_choice(&self, voter_id: Uuid) -> Result<VoteChoice, StoreError>;

    /// Sets `voted_for` on the row keyed by `voter_id`, whatever it currently holds.
    async fn update_voter_choice(&self, voter_id: Uuid, candidate: &str) -> Result<(), StoreError>;

    fn subscribe(&self, topic: ChangeTopic) -> Result<Subscription, StoreError>;
}

/// Stand-in used when no database is configured; every call fails with `NotConfigured`.
pub struct UnconfiguredStore;

#[rocket::async_trait]
impl VoterStore for UnconfiguredStore {
    fn is_configured(&self) -> bool {
        false
    }

    async fn fetch_all_voters(&self) -> Result<Vec<VoterRecord>, StoreError> {
        Err(StoreError::NotConfigured)
    }

    async fn fetch_voted_choices(&self) -> Result<Vec<VoteChoice>, StoreError> {
        Err(StoreError::NotConfigured)
    }

    async fn fetch_voter_choice(&self, _voter_id: Uuid) -> Result<VoteChoice, StoreError> {
        Err(StoreError::NotConfigured)
    }

    async fn update_voter_choice(&self, _voter_id: Uuid, _candidate: &str) -> Result<(), StoreError> {
        Err(StoreError::NotConfigured)
    }

    fn subscribe(&self, _topic: ChangeTopic) -> Result<Subscription, StoreError> {
        Err(StoreError::NotConfigured)
    }
}
