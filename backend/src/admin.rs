use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, warn};
use shared::{AdminSummary, CandidateRoster, VoterQuery, VoterRecord};
use crate::store::{StoreError, VoterStore};

/// The operator's copy of the voter table, replaced wholesale on each refresh.
pub struct AdminBoard {
    roster: CandidateRoster,
    store: Arc<dyn VoterStore>,
    snapshot: RwLock<Vec<VoterRecord>>,
}

impl AdminBoard {
    pub fn new(roster: CandidateRoster, store: Arc<dyn VoterStore>) -> Self {
        Self { roster, store, snapshot: RwLock::new(Vec::new()) }
    }

    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        if !self.store.is_configured() {
            warn!("Admin refresh skipped - data store is not configured");
            return Ok(self.len());
        }

        match self.store.fetch_all_voters().await {
            Ok(voters) => {
                let count = voters.len();
                *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = voters;
                info!("📋 Loaded {} voters", count);
                Ok(count)
            }
            Err(e) => {
                error!("Error fetching voters: {}", e);
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<VoterRecord> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn query(&self, query: &VoterQuery) -> Vec<VoterRecord> {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        query.apply(&snapshot).into_iter().cloned().collect()
    }

    pub fn summary(&self) -> AdminSummary {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        AdminSummary::from_snapshot(&self.roster, &snapshot)
    }
}
