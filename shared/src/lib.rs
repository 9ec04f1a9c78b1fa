pub mod error;
pub mod models;
pub mod validation;
pub mod session;
pub mod roster;
pub mod tally;
pub mod filter;

pub use error::ErrorResponse;
pub use models::*;
pub use validation::*;
pub use session::*;
pub use roster::{CandidateRoster, DEFAULT_CANDIDATES};
pub use tally::{Tally, count_by_candidate, percentage, percentage_label};
pub use filter::{AdminSummary, CandidateFilter, FilterOption, VoterQuery, FILTER_ALL, FILTER_NOT_VOTED};

#[cfg(test)]
mod tests;
