use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::validation::ValidationError;

pub const VOTER_ID_HEADER: &str = "X-Voter-Id";

/// The authenticated voter behind a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterSession {
    pub voter_id: Uuid,
}

impl VoterSession {
    pub fn from_header(raw: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(raw.trim())
            .map(|voter_id| Self { voter_id })
            .map_err(|_| ValidationError::InvalidVoterId(raw.to_string()))
    }
}

// Backend-specific Rocket implementation
#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::Status;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for VoterSession {
        type Error = ValidationError;

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let Some(raw) = req.headers().get_one(VOTER_ID_HEADER) else {
                return Outcome::Error((Status::Unauthorized, ValidationError::InvalidVoterId(String::new())));
            };

            match VoterSession::from_header(raw) {
                Ok(session) => Outcome::Success(session),
                Err(e) => Outcome::Error((Status::Unauthorized, e)),
            }
        }
    }
}
