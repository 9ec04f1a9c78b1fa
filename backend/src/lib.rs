pub mod admin;
pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod memory;
pub mod queries;
pub mod routes;
pub mod store;
pub mod tally_board;
pub mod voting;
pub use shared::{models::*, error::*, session::*};
pub use shared::{CandidateRoster, Tally, AdminSummary, CandidateFilter, VoterQuery};
