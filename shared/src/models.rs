use serde::{Serialize, Deserialize};
use time::{macros::format_description, OffsetDateTime};
use uuid::Uuid;

/// One registered participant and their ballot state.
///
/// Field names follow the stored `voters` columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct VoterRecord {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub voted_for: Option<String>,
    pub created_at: OffsetDateTime,
}

impl VoterRecord {
    pub fn has_voted(&self) -> bool {
        self.voted_for.is_some()
    }

    /// Registration time as shown in the admin table, e.g. `05 Mar 2025 14:07`.
    pub fn registered_label(&self) -> String {
        let format = format_description!("[day] [month repr:short] [year] [hour]:[minute]");
        self.created_at.format(&format).unwrap_or_default()
    }
}

/// The `voted_for` column on its own, as returned by the tally and re-check reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct VoteChoice {
    pub voted_for: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteCount {
    pub candidate_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TallySource {
    /// Nothing fetched yet.
    Pending,
    Live,
    /// The fetch failed and the fallback policy produced these numbers.
    Fallback,
    Unconfigured,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TallyRow {
    pub candidate_name: String,
    pub count: usize,
    pub percentage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TallyView {
    pub total_votes: usize,
    pub source: TallySource,
    pub candidates: Vec<TallyRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "candidate", rename_all = "camelCase")]
pub enum CastOutcome {
    Recorded(String),
    /// A choice was already stored for this voter; carries that choice.
    AlreadyVoted(String),
    /// The voter already voted locally or a cast is still in flight.
    Ignored,
}

impl CastOutcome {
    pub fn message(&self) -> String {
        match self {
            CastOutcome::Recorded(candidate) => {
                format!("Thank you! Your vote for {} has been saved.", candidate)
            }
            CastOutcome::AlreadyVoted(candidate) => {
                format!("You have already voted for {}.", candidate)
            }
            CastOutcome::Ignored => "Your vote is already being processed or has been recorded.".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRequest {
    pub candidate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CastResponse {
    pub outcome: CastOutcome,
    pub message: String,
}

impl From<CastOutcome> for CastResponse {
    fn from(outcome: CastOutcome) -> Self {
        let message = outcome.message();
        Self { outcome, message }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub voter_id: Uuid,
    pub has_voted: bool,
    pub my_vote: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoterRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub voted_for: Option<String>,
    pub registered_at: String,
}

impl From<&VoterRecord> for VoterRow {
    fn from(voter: &VoterRecord) -> Self {
        Self {
            id: voter.id,
            name: voter.name.clone(),
            address: voter.address.clone(),
            voted_for: voter.voted_for.clone(),
            registered_at: voter.registered_label(),
        }
    }
}
