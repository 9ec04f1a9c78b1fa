use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::models::{VoteCount, VoterRecord};
use crate::roster::CandidateRoster;
use crate::tally::count_by_candidate;
use crate::validation::{validate_search_term, ValidationError};

pub const FILTER_ALL: &str = "all";
pub const FILTER_NOT_VOTED: &str = "not-voted";

/// Which voters the admin table shows, by ballot state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CandidateFilter {
    #[default]
    All,
    NotVoted,
    Candidate(String),
}

impl CandidateFilter {
    fn matches(&self, voter: &VoterRecord) -> bool {
        match self {
            CandidateFilter::All => true,
            CandidateFilter::NotVoted => voter.voted_for.is_none(),
            CandidateFilter::Candidate(name) => voter.voted_for.as_deref() == Some(name.as_str()),
        }
    }

    /// Parses a selector and rejects candidates missing from the roster.
    pub fn parse_for(roster: &CandidateRoster, raw: &str) -> Result<Self, ValidationError> {
        let filter: Self = raw.parse()?;
        if let CandidateFilter::Candidate(name) = &filter {
            if !roster.contains(name) {
                return Err(ValidationError::UnknownCandidate(name.clone()));
            }
        }
        Ok(filter)
    }
}

impl FromStr for CandidateFilter {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "" | FILTER_ALL => CandidateFilter::All,
            FILTER_NOT_VOTED => CandidateFilter::NotVoted,
            name => CandidateFilter::Candidate(name.to_string()),
        })
    }
}

impl fmt::Display for CandidateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateFilter::All => f.write_str(FILTER_ALL),
            CandidateFilter::NotVoted => f.write_str(FILTER_NOT_VOTED),
            CandidateFilter::Candidate(name) => f.write_str(name),
        }
    }
}

/// Search term plus candidate selector, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoterQuery {
    search: String,
    candidate: CandidateFilter,
}

impl VoterQuery {
    pub fn new(search: impl Into<String>, candidate: CandidateFilter) -> Result<Self, ValidationError> {
        let search = search.into();
        validate_search_term(&search)?;
        Ok(Self { search, candidate })
    }

    pub fn search(&self) -> &str { &self.search }

    pub fn candidate(&self) -> &CandidateFilter { &self.candidate }

    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty() && self.candidate == CandidateFilter::All
    }

    /// Keeps snapshot order.
    pub fn apply<'a>(&self, voters: &'a [VoterRecord]) -> Vec<&'a VoterRecord> {
        if self.is_unfiltered() {
            return voters.iter().collect();
        }
        let needle = self.search.to_lowercase();
        voters.iter()
            .filter(|voter| matches_search(voter, &needle) && self.candidate.matches(voter))
            .collect()
    }
}

// `needle` must already be lowercased.
fn matches_search(voter: &VoterRecord, needle: &str) -> bool {
    needle.is_empty()
        || voter.name.to_lowercase().contains(needle)
        || voter.address.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Population counts over the whole snapshot, whatever filter is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_voters: usize,
    pub total_voted: usize,
    pub total_not_voted: usize,
    pub candidate_counts: Vec<VoteCount>,
}

impl AdminSummary {
    pub fn from_snapshot(roster: &CandidateRoster, voters: &[VoterRecord]) -> Self {
        let total_voters = voters.len();
        let total_voted = voters.iter().filter(|voter| voter.has_voted()).count();

        Self {
            total_voters,
            total_voted,
            total_not_voted: total_voters - total_voted,
            candidate_counts: count_by_candidate(
                roster,
                voters.iter().filter_map(|voter| voter.voted_for.as_deref()),
            ),
        }
    }

    pub fn count_for(&self, candidate: &str) -> usize {
        self.candidate_counts.iter()
            .find(|entry| entry.candidate_name == candidate)
            .map_or(0, |entry| entry.count)
    }

    /// Entries for the candidate selector, `all` and `not-voted` first.
    pub fn selector_options(&self) -> Vec<FilterOption> {
        let fixed = [
            FilterOption {
                value: FILTER_ALL.into(),
                label: format!("All voters ({})", self.total_voters),
                count: self.total_voters,
            },
            FilterOption {
                value: FILTER_NOT_VOTED.into(),
                label: format!("Not voted yet ({})", self.total_not_voted),
                count: self.total_not_voted,
            },
        ];

        fixed.into_iter()
            .chain(self.candidate_counts.iter().map(|entry| FilterOption {
                value: entry.candidate_name.clone(),
                label: format!("{} ({} votes)", entry.candidate_name, entry.count),
                count: entry.count,
            }))
            .collect()
    }
}
