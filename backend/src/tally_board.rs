use std::str::FromStr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, PoisonError, RwLock,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use shared::{CandidateRoster, Tally, TallySource};
use crate::store::{ChangeTopic, StoreError, VoterStore};

/// What the board publishes when the vote-count fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Show every candidate at zero.
    #[default]
    ZeroOnError,
    /// Keep the last counts, flagged as not live.
    KeepLast,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "zero" => Ok(FallbackPolicy::ZeroOnError),
            "keep-last" => Ok(FallbackPolicy::KeepLast),
            other => Err(format!("unknown tally fallback policy: {}", other)),
        }
    }
}

/// Live per-candidate counts, refetched from the store on every refresh.
pub struct TallyBoard {
    roster: CandidateRoster,
    store: Arc<dyn VoterStore>,
    policy: FallbackPolicy,
    started: AtomicU64,
    current: RwLock<Published>,
}

/// The tally on display and the refresh that produced it.
struct Published {
    generation: u64,
    tally: Tally,
}

impl TallyBoard {
    pub fn new(roster: CandidateRoster, store: Arc<dyn VoterStore>, policy: FallbackPolicy) -> Self {
        let current = RwLock::new(Published {
            generation: 0,
            tally: Tally::zeroed(&roster, TallySource::Pending),
        });
        Self { roster, store, policy, started: AtomicU64::new(0), current }
    }

    pub fn current(&self) -> Tally {
        self.current.read().unwrap_or_else(PoisonError::into_inner).tally.clone()
    }

    /// Refetches every non-null choice and recounts. Never fails: a fetch
    /// error is resolved through the fallback policy.
    ///
    /// Overlapping refreshes publish in start order; a result that finishes
    /// after a newer one is discarded and the newer tally is returned.
    pub async fn refresh(&self) -> Tally {
        let generation = self.started.fetch_add(1, Ordering::AcqRel) + 1;
        let next = if !self.store.is_configured() {
            Tally::zeroed(&self.roster, TallySource::Unconfigured)
        } else {
            match self.store.fetch_voted_choices().await {
                Ok(choices) => Tally::from_choices(
                    &self.roster,
                    choices.iter().filter_map(|c| c.voted_for.as_deref()),
                    TallySource::Live,
                ),
                Err(e) => {
                    warn!("Failed to fetch vote counts: {}", e);
                    self.fallback()
                }
            }
        };

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if generation < current.generation {
            debug!(generation, published = current.generation, "Discarding stale tally");
            return current.tally.clone();
        }
        debug!(total = next.total_votes(), source = ?next.source(), "Tally refreshed");
        *current = Published { generation, tally: next.clone() };
        next
    }

    fn fallback(&self) -> Tally {
        match self.policy {
            FallbackPolicy::ZeroOnError => Tally::zeroed(&self.roster, TallySource::Fallback),
            FallbackPolicy::KeepLast => self.current().with_source(TallySource::Fallback),
        }
    }

    /// Subscribes to voter updates and refreshes on each one until the
    /// returned guard is dropped.
    pub fn watch(self: &Arc<Self>) -> Result<TallyWatch, StoreError> {
        let mut subscription = self.store.subscribe(ChangeTopic::VOTER_UPDATES)?;
        let board = Arc::clone(self);

        let task = tokio::spawn(async move {
            while let Some(change) = subscription.next_change().await {
                debug!(voter_id = ?change.voter_id, "Voter updated, refreshing tally");
                board.refresh().await;
            }
            info!("Voter change stream closed");
        });

        Ok(TallyWatch { task })
    }
}

/// Keeps the tally subscription alive; dropping it unsubscribes.
#[derive(Debug)]
pub struct TallyWatch {
    task: JoinHandle<()>,
}

impl TallyWatch {
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for TallyWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
