use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use crate::models::{TallyRow, TallySource, TallyView, VoteCount};
use crate::roster::CandidateRoster;

/// Counts one entry per roster candidate, in roster order, zeros included.
///
/// Choices naming someone outside the roster are ignored here; callers that
/// need the grand total count choices themselves.
pub fn count_by_candidate<'a, I>(roster: &CandidateRoster, choices: I) -> Vec<VoteCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for choice in choices {
        *counts.entry(choice).or_insert(0) += 1;
    }

    roster.iter()
        .map(|candidate| VoteCount {
            candidate_name: candidate.to_string(),
            count: counts.get(candidate).copied().unwrap_or(0),
        })
        .collect()
}

/// `count / total * 100`, or `0.0` when nothing has been cast.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

pub fn percentage_label(count: usize, total: usize) -> String {
    format!("{:.1}", percentage(count, total))
}

/// Per-candidate counts plus the grand total of non-null choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    counts: Vec<VoteCount>,
    total_votes: usize,
    source: TallySource,
}

impl Tally {
    pub fn from_choices<'a, I>(roster: &CandidateRoster, choices: I, source: TallySource) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let choices: Vec<&str> = choices.into_iter().collect();
        Self {
            total_votes: choices.len(),
            counts: count_by_candidate(roster, choices),
            source,
        }
    }

    pub fn zeroed(roster: &CandidateRoster, source: TallySource) -> Self {
        Self::from_choices(roster, std::iter::empty(), source)
    }

    pub fn counts(&self) -> &[VoteCount] { &self.counts }

    pub fn total_votes(&self) -> usize { self.total_votes }

    pub fn source(&self) -> TallySource { self.source }

    pub fn with_source(mut self, source: TallySource) -> Self {
        self.source = source;
        self
    }

    pub fn count_for(&self, candidate: &str) -> usize {
        self.counts.iter()
            .find(|entry| entry.candidate_name == candidate)
            .map_or(0, |entry| entry.count)
    }

    pub fn percentage_for(&self, candidate: &str) -> f64 {
        percentage(self.count_for(candidate), self.total_votes)
    }

    pub fn percentage_label_for(&self, candidate: &str) -> String {
        percentage_label(self.count_for(candidate), self.total_votes)
    }

    pub fn view(&self) -> TallyView {
        TallyView {
            total_votes: self.total_votes,
            source: self.source,
            candidates: self.counts.iter()
                .map(|entry| TallyRow {
                    candidate_name: entry.candidate_name.clone(),
                    count: entry.count,
                    percentage: percentage_label(entry.count, self.total_votes),
                })
                .collect(),
        }
    }
}
