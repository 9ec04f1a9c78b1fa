use std::time::Duration;
use sqlx::{PgPool, postgres::PgListener};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;
use shared::models::*;
use crate::store::{ChangeTopic, StoreError, Subscription, VoterChange, VoterStore, CHANGE_BUFFER};

/// Channel the `voters` update trigger notifies, with the row id as payload.
pub const CHANGE_CHANNEL: &str = "voters_changes";

const LISTENER_RETRY: Duration = Duration::from_secs(1);

/// `VoterStore` backed by the Postgres `voters` table.
///
/// Row changes arrive through `LISTEN voters_changes` on a dedicated
/// connection and are fanned out to every subscription.
pub struct PgVoterStore {
    pool: PgPool,
    changes: broadcast::Sender<VoterChange>,
    listener: JoinHandle<()>,
}

impl PgVoterStore {
    pub async fn connect(pool: PgPool) -> Result<Self, StoreError> {
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        info!("👂 Listening for voter changes on {}", CHANGE_CHANNEL);

        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        let listener = tokio::spawn(forward_notifications(listener, changes.clone()));

        Ok(Self { pool, changes, listener })
    }
}

impl Drop for PgVoterStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn forward_notifications(mut listener: PgListener, changes: broadcast::Sender<VoterChange>) {
    loop {
        match listener.recv().await {
            Ok(notification) => {
                let voter_id = Uuid::parse_str(notification.payload()).ok();
                debug!(?voter_id, "Voter change notification");
                // No receivers is fine; nobody is watching yet.
                let _ = changes.send(VoterChange::updated(voter_id));
            }
            Err(e) => {
                error!("Voter change listener failed: {}", e);
                tokio::time::sleep(LISTENER_RETRY).await;
            }
        }
    }
}

#[rocket::async_trait]
impl VoterStore for PgVoterStore {
    async fn fetch_all_voters(&self) -> Result<Vec<VoterRecord>, StoreError> {
        let voters = sqlx::query_as::<_, VoterRecord>(
            "SELECT id, name, address, voted_for, created_at
             FROM voters ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(voters)
    }

    async fn fetch_voted_choices(&self) -> Result<Vec<VoteChoice>, StoreError> {
        let choices = sqlx::query_as::<_, VoteChoice>(
            "SELECT voted_for FROM voters WHERE voted_for IS NOT NULL"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    #[instrument(skip(self))]
    async fn fetch_voter_choice(&self, voter_id: Uuid) -> Result<VoteChoice, StoreError> {
        sqlx::query_as::<_, VoteChoice>("SELECT voted_for FROM voters WHERE id = $1")
            .bind(voter_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(voter_id))
    }

    #[instrument(skip(self))]
    async fn update_voter_choice(&self, voter_id: Uuid, candidate: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE voters SET voted_for = $1 WHERE id = $2")
            .bind(candidate)
            .bind(voter_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(voter_id));
        }
        Ok(())
    }

    fn subscribe(&self, topic: ChangeTopic) -> Result<Subscription, StoreError> {
        Ok(Subscription::new(topic, self.changes.subscribe()))
    }
}
