use std::collections::HashSet;
use crate::roster::CandidateRoster;

pub const MAX_CANDIDATE_LENGTH: usize = 40;
pub const MAX_SEARCH_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Roster must contain at least one candidate")]
    EmptyRoster,
    #[error("Empty candidate name")]
    EmptyCandidate,
    #[error("Candidate name exceeds maximum length of {MAX_CANDIDATE_LENGTH}")]
    CandidateTooLong,
    #[error("Duplicate candidate: {0}")]
    DuplicateCandidate(String),
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),
    #[error("Search term exceeds maximum length of {MAX_SEARCH_LENGTH}")]
    SearchTooLong,
    #[error("Invalid voter id: {0}")]
    InvalidVoterId(String),
}

pub fn validate_roster_names(names: &[String]) -> Result<(), ValidationError> {
    if names.is_empty() { return Err(ValidationError::EmptyRoster); }
    if names.iter().any(|name| name.trim().is_empty()) { return Err(ValidationError::EmptyCandidate); }
    if names.iter().any(|name| name.chars().count() > MAX_CANDIDATE_LENGTH) {
        return Err(ValidationError::CandidateTooLong);
    }

    let mut seen = HashSet::with_capacity(names.len());
    if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(ValidationError::DuplicateCandidate(dup.clone()));
    }

    Ok(())
}

/// Ballots may only name a roster entry; matching is exact.
pub fn validate_candidate(roster: &CandidateRoster, candidate: &str) -> Result<(), ValidationError> {
    if candidate.trim().is_empty() { return Err(ValidationError::EmptyCandidate); }
    if !roster.contains(candidate) {
        return Err(ValidationError::UnknownCandidate(candidate.to_string()));
    }
    Ok(())
}

pub fn validate_search_term(term: &str) -> Result<(), ValidationError> {
    if term.chars().count() > MAX_SEARCH_LENGTH { return Err(ValidationError::SearchTooLong); }
    Ok(())
}
