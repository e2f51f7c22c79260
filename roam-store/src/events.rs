use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use roam_core::{CoreResult, ProfileSubscription};
use roam_shared::ProfileNotification;

use crate::database::backend_error;
use crate::profile_repo::fetch_profile;

/// Channel the `profiles` trigger publishes row changes on.
pub const PROFILE_CHANNEL: &str = "profile_changes";

const SUBSCRIPTION_BUFFER: usize = 16;

/// Opens one `LISTEN` connection per subscription and forwards the
/// notifications that concern the watched row. Notifications carry only
/// `{op, id}`; updates are resolved by reading the row again.
#[derive(Clone)]
pub struct ProfileChangeListener {
    pool: PgPool,
}

impl ProfileChangeListener {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn subscribe(&self, profile_id: Uuid) -> CoreResult<ProfileSubscription> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(backend_error)?;
        listener
            .listen(PROFILE_CHANNEL)
            .await
            .map_err(backend_error)?;
        info!("Listening on {} for profile {}", PROFILE_CHANNEL, profile_id);

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let pool = self.pool.clone();
        let pump = tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(notification) => notification,
                    Err(e) => {
                        warn!("Profile listener for {} failed: {}", profile_id, e);
                        break;
                    }
                };

                let parsed: ProfileNotification = match serde_json::from_str(notification.payload()) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Ignoring malformed profile notification: {}", e);
                        continue;
                    }
                };
                if parsed.id != profile_id {
                    continue;
                }
                let current = if parsed.needs_record() {
                    match fetch_profile(&pool, profile_id).await {
                        Ok(current) => current,
                        Err(e) => {
                            warn!("Could not reload profile {}: {}", profile_id, e);
                            continue;
                        }
                    }
                } else {
                    None
                };
                if let Some(change) = parsed.into_change(current) {
                    if tx.send(change).await.is_err() {
                        break;
                    }
                }
            }
        });

        Ok(ProfileSubscription::new(profile_id, rx, pump))
    }
}
