use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use roam_core::repository::ProfileRepository;
use roam_shared::{Profile, ProfileChange, ProfilePatch};

use crate::state::{Loadable, MutationStatus};

pub const PROFILE_NOT_FOUND: &str = "Profile not found";

/// The watched id and its live subscription task, if subscribing succeeded.
/// Dropping it aborts the task, which drops the subscription it owns.
struct ActiveWatch {
    user_id: Uuid,
    task: Option<JoinHandle<()>>,
}

impl Drop for ActiveWatch {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        debug!("Stopped watching profile {}", self.user_id);
    }
}

/// Read side of a profile: fetch by id plus one live change subscription.
///
/// At most one subscription is held at a time. Watching another id (or `None`)
/// tears the previous one down first, as does dropping the watcher.
pub struct ProfileWatcher {
    repo: Arc<dyn ProfileRepository>,
    state: Arc<watch::Sender<Loadable<Profile>>>,
    active: Mutex<Option<ActiveWatch>>,
}

impl ProfileWatcher {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        let (state, _) = watch::channel(Loadable::default());
        Self {
            repo,
            state: Arc::new(state),
            active: Mutex::new(None),
        }
    }

    /// Switches to `user_id`. `None` leaves the watcher idle with no data.
    pub async fn watch(&self, user_id: Option<Uuid>) {
        let mut active = self.active.lock().await;
        active.take();

        let Some(user_id) = user_id else {
            self.state.send_modify(|s| s.reset());
            return;
        };

        self.state.send_modify(|s| {
            s.reset();
            s.begin();
        });

        // Subscribe before fetching so no change between the two is lost
        let task = match self.repo.subscribe(user_id).await {
            Ok(mut subscription) => {
                let state = self.state.clone();
                let task = tokio::spawn(async move {
                    while let Some(change) = subscription.recv().await {
                        match change {
                            ProfileChange::Updated(profile) => {
                                debug!("Profile {} updated remotely", profile.id);
                                state.send_modify(|s| s.replace(Some(profile)));
                            }
                            ProfileChange::Deleted(id) => {
                                info!("Profile {} deleted remotely", id);
                                state.send_modify(|s| s.replace(None));
                            }
                        }
                    }
                });
                Some(task)
            }
            Err(e) => {
                warn!("Live updates unavailable for profile {}: {}", user_id, e);
                None
            }
        };
        *active = Some(ActiveWatch { user_id, task });

        self.fetch(user_id).await;
    }

    /// Refetches the watched profile without touching the subscription. Works
    /// whether or not live updates are available.
    pub async fn refetch(&self) {
        let user_id = self.active.lock().await.as_ref().map(|a| a.user_id);
        match user_id {
            Some(user_id) => {
                self.state.send_modify(|s| s.begin());
                self.fetch(user_id).await;
            }
            None => debug!("Refetch requested with no profile watched"),
        }
    }

    async fn fetch(&self, user_id: Uuid) {
        match self.repo.get_profile(user_id).await {
            Ok(Some(profile)) => self.state.send_modify(|s| s.succeed(profile)),
            Ok(None) => {
                warn!("Profile {} not found", user_id);
                self.state.send_modify(|s| s.fail(PROFILE_NOT_FOUND));
            }
            Err(e) => {
                error!("Error fetching profile {}: {}", user_id, e);
                self.state.send_modify(|s| s.fail(e.to_string()));
            }
        }
    }

    pub async fn watched_id(&self) -> Option<Uuid> {
        self.active.lock().await.as_ref().map(|a| a.user_id)
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().data().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(String::from)
    }

    pub fn state(&self) -> Loadable<Profile> {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<Loadable<Profile>> {
        self.state.subscribe()
    }
}

/// Write side of a profile.
pub struct ProfileEditor {
    repo: Arc<dyn ProfileRepository>,
    status: watch::Sender<MutationStatus>,
}

impl ProfileEditor {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        let (status, _) = watch::channel(MutationStatus::default());
        Self { repo, status }
    }

    /// Partial update stamping a fresh `updated_at`, even for an empty patch.
    pub async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> Option<Profile> {
        self.status.send_modify(|s| s.begin());

        match self.repo.update_profile(user_id, patch).await {
            Ok(Some(profile)) => {
                info!("Updated profile {}", user_id);
                self.status.send_modify(|s| s.finish(None));
                Some(profile)
            }
            Ok(None) => {
                warn!("Profile {} not found for update", user_id);
                self.status.send_modify(|s| s.missing(PROFILE_NOT_FOUND));
                None
            }
            Err(e) => {
                error!("Error updating profile {}: {}", user_id, e);
                self.status.send_modify(|s| s.finish(Some(e.to_string())));
                None
            }
        }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }
}
