use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use shared::{validate_candidate, CandidateRoster, CastOutcome, SessionState, ValidationError};
use crate::store::{StoreError, VoterStore};
use crate::tally_board::TallyBoard;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CastError {
    #[error("Invalid candidate: {0}")]
    InvalidCandidate(#[from] ValidationError),
    #[error("Data store is not configured")]
    NotConfigured,
    #[error("Failed to cast vote: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CastError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotConfigured => CastError::NotConfigured,
            other => CastError::Store(other),
        }
    }
}

#[derive(Debug, Default)]
struct BallotState {
    has_voted: bool,
    my_vote: Option<String>,
}

/// Held while a cast is running; a second cast sees the flag and backs off.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One voter's ballot: read, re-check, write once, then refresh the tally.
pub struct VotingSession {
    voter_id: Uuid,
    roster: CandidateRoster,
    store: Arc<dyn VoterStore>,
    tally: Arc<TallyBoard>,
    state: Mutex<BallotState>,
    in_flight: AtomicBool,
}

impl VotingSession {
    /// `recorded` is the choice already on the voter's record at login, if any.
    pub fn new(
        voter_id: Uuid,
        roster: CandidateRoster,
        store: Arc<dyn VoterStore>,
        tally: Arc<TallyBoard>,
        recorded: Option<String>,
    ) -> Self {
        let state = BallotState { has_voted: recorded.is_some(), my_vote: recorded };
        Self {
            voter_id,
            roster,
            store,
            tally,
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn has_voted(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).has_voted
    }

    pub fn my_vote(&self) -> Option<String> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).my_vote.clone()
    }

    pub fn is_casting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> SessionState {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        SessionState {
            voter_id: self.voter_id,
            has_voted: state.has_voted,
            my_vote: state.my_vote.clone(),
        }
    }

    fn record(&self, candidate: String) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.has_voted = true;
        state.my_vote = Some(candidate);
    }

    /// Casts this voter's single ballot.
    ///
    /// The stored choice is re-read right before writing because local state
    /// may be stale; a choice recorded elsewhere is adopted, never overwritten.
    /// On any store failure local state is left untouched.
    #[instrument(skip(self), fields(voter_id = %self.voter_id))]
    pub async fn cast(&self, candidate: &str) -> Result<CastOutcome, CastError> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            debug!("Cast already in flight");
            return Ok(CastOutcome::Ignored);
        };
        // Checked under the guard so a cast that just finished is seen.
        if self.has_voted() {
            debug!("Voter already voted in this session");
            return Ok(CastOutcome::Ignored);
        }

        validate_candidate(&self.roster, candidate)?;

        if !self.store.is_configured() {
            warn!("Vote rejected - data store is not configured");
            return Err(CastError::NotConfigured);
        }

        let current = self.store.fetch_voter_choice(self.voter_id).await.map_err(|e| {
            error!("Failed to re-check voter choice: {}", e);
            CastError::from(e)
        })?;

        if let Some(recorded) = current.voted_for {
            info!(recorded = %recorded, "Voter already has a recorded choice");
            self.record(recorded.clone());
            return Ok(CastOutcome::AlreadyVoted(recorded));
        }

        self.store.update_voter_choice(self.voter_id, candidate).await.map_err(|e| {
            error!("Failed to record vote: {}", e);
            CastError::from(e)
        })?;

        self.record(candidate.to_string());
        info!("✓ Vote recorded");

        self.tally.refresh().await;
        Ok(CastOutcome::Recorded(candidate.to_string()))
    }
}

/// Voting sessions by voter id, opened on first use.
pub struct SessionRegistry {
    roster: CandidateRoster,
    store: Arc<dyn VoterStore>,
    tally: Arc<TallyBoard>,
    sessions: tokio::sync::Mutex<HashMap<Uuid, Arc<VotingSession>>>,
}

impl SessionRegistry {
    pub fn new(roster: CandidateRoster, store: Arc<dyn VoterStore>, tally: Arc<TallyBoard>) -> Self {
        Self {
            roster,
            store,
            tally,
            sessions: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Returns the voter's session, seeding a new one from the stored record.
    ///
    /// The store is read without holding the registry lock. Without a
    /// configured store the session starts empty and is not kept, since no
    /// record backs the id.
    pub async fn open(&self, voter_id: Uuid) -> Result<Arc<VotingSession>, StoreError> {
        if let Some(session) = self.sessions.lock().await.get(&voter_id) {
            return Ok(Arc::clone(session));
        }

        let (recorded, keep) = match self.store.fetch_voter_choice(voter_id).await {
            Ok(choice) => (choice.voted_for, true),
            Err(StoreError::NotConfigured) => (None, false),
            Err(e) => return Err(e),
        };

        let session = Arc::new(VotingSession::new(
            voter_id,
            self.roster.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.tally),
            recorded,
        ));
        if !keep {
            return Ok(session);
        }

        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(voter_id).or_insert_with(|| {
            debug!(%voter_id, voted = session.has_voted(), "Opened voting session");
            session
        });
        Ok(Arc::clone(session))
    }

    pub async fn close(&self, voter_id: Uuid) -> bool {
        self.sessions.lock().await.remove(&voter_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
