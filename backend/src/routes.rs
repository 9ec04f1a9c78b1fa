use std::sync::Arc;
use rocket::{State, get, post, delete, routes, catchers, http::Status, serde::json::Json};
use tracing::{debug, warn, instrument};
use shared::{
    AdminSummary, CandidateFilter, CandidateRoster, CastOutcome, CastRequest, CastResponse,
    FilterOption, SessionState, TallyView, VoterQuery, VoterRow, VoterSession,
};
use serde::Serialize;
use crate::{
    admin::AdminBoard,
    catchers::{bad_request, internal_error, not_found, unauthorized, unprocessable},
    cors::CORS,
    error::ApiError,
    store::VoterStore,
    tally_board::{FallbackPolicy, TallyBoard, TallyWatch},
    voting::SessionRegistry,
};

pub struct AppState {
    pub roster: CandidateRoster,
    pub store: Arc<dyn VoterStore>,
    pub tally: Arc<TallyBoard>,
    pub admin: AdminBoard,
    pub sessions: SessionRegistry,
    tally_watch: Option<TallyWatch>,
}

impl AppState {
    pub fn new(store: Arc<dyn VoterStore>, roster: CandidateRoster, policy: FallbackPolicy) -> Self {
        let tally = Arc::new(TallyBoard::new(roster.clone(), Arc::clone(&store), policy));
        Self {
            admin: AdminBoard::new(roster.clone(), Arc::clone(&store)),
            sessions: SessionRegistry::new(roster.clone(), Arc::clone(&store), Arc::clone(&tally)),
            roster,
            store,
            tally,
            tally_watch: None,
        }
    }

    /// Initial load of both views plus the live tally subscription.
    /// A missing or failing store leaves the views empty instead of failing.
    pub async fn load(&mut self) {
        self.tally.refresh().await;
        if let Err(e) = self.admin.refresh().await {
            warn!("Admin view starts empty: {}", e);
        }

        self.tally_watch = match self.tally.watch() {
            Ok(watch) => Some(watch),
            Err(e) => {
                warn!("Live tally updates disabled: {}", e);
                None
            }
        };
    }

    pub fn is_watching(&self) -> bool {
        self.tally_watch.as_ref().is_some_and(TallyWatch::is_active)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummaryView {
    #[serde(flatten)]
    pub summary: AdminSummary,
    pub options: Vec<FilterOption>,
}

#[get("/candidates")]
pub fn list_candidates(state: &State<AppState>) -> Json<CandidateRoster> {
    Json(state.roster.clone())
}

#[get("/tally")]
pub fn get_tally(state: &State<AppState>) -> Json<TallyView> {
    Json(state.tally.current().view())
}

#[get("/session")]
pub async fn get_session(state: &State<AppState>, session: VoterSession) -> Result<Json<SessionState>, ApiError> {
    let voting = state.sessions.open(session.voter_id).await?;
    Ok(Json(voting.snapshot()))
}

#[delete("/session")]
pub async fn end_session(state: &State<AppState>, session: VoterSession) -> Status {
    if state.sessions.close(session.voter_id).await {
        debug!(voter_id = %session.voter_id, "Voting session closed");
    }
    Status::NoContent
}

#[instrument(skip(state, request), fields(voter_id = %session.voter_id))]
#[post("/vote", format = "json", data = "<request>")]
pub async fn cast_vote(
    state: &State<AppState>,
    session: VoterSession,
    request: Json<CastRequest>,
) -> Result<(Status, Json<CastResponse>), ApiError> {
    let voting = state.sessions.open(session.voter_id).await?;
    let outcome = voting.cast(&request.candidate).await?;

    let status = match &outcome {
        CastOutcome::Recorded(_) => Status::Ok,
        CastOutcome::AlreadyVoted(_) => Status::Conflict,
        CastOutcome::Ignored => Status::Accepted,
    };
    Ok((status, Json(CastResponse::from(outcome))))
}

/// Reloads the admin snapshot before a view is served; on failure the
/// previous snapshot is served.
async fn reload_admin(admin: &AdminBoard) {
    if let Err(e) = admin.refresh().await {
        warn!("Serving previous admin snapshot: {}", e);
    }
}

#[get("/admin/voters?<search>&<candidate>")]
pub async fn list_voters(
    state: &State<AppState>,
    search: Option<String>,
    candidate: Option<String>,
) -> Result<Json<Vec<VoterRow>>, ApiError> {
    let filter = match candidate.as_deref() {
        Some(raw) => CandidateFilter::parse_for(&state.roster, raw)?,
        None => CandidateFilter::All,
    };
    let query = VoterQuery::new(search.unwrap_or_default(), filter)?;

    reload_admin(&state.admin).await;
    Ok(Json(state.admin.query(&query).iter().map(VoterRow::from).collect()))
}

impl AdminSummaryView {
    fn from_board(admin: &AdminBoard) -> Self {
        let summary = admin.summary();
        let options = summary.selector_options();
        Self { summary, options }
    }
}

#[get("/admin/summary")]
pub async fn admin_summary(state: &State<AppState>) -> Json<AdminSummaryView> {
    reload_admin(&state.admin).await;
    Json(AdminSummaryView::from_board(&state.admin))
}

#[post("/admin/refresh")]
pub async fn refresh_admin(state: &State<AppState>) -> Result<Json<AdminSummaryView>, ApiError> {
    state.admin.refresh().await?;
    Ok(Json(AdminSummaryView::from_board(&state.admin)))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

pub fn build_rocket(state: AppState) -> rocket::Rocket<rocket::Build> {
    rocket::build()
        .attach(CORS)
        .manage(state)
        .mount(
            "/api",
            routes![
                list_candidates,
                get_tally,
                get_session,
                end_session,
                cast_vote,
                list_voters,
                admin_summary,
                refresh_admin,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                unauthorized,
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        )
}
