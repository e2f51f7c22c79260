use roam_shared::ProfileChange;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Live change feed for one profile row.
///
/// Backends forward notifications from a pump task into the channel. Dropping
/// the subscription aborts the pump, which releases the backend listener.
pub struct ProfileSubscription {
    profile_id: Uuid,
    rx: mpsc::Receiver<ProfileChange>,
    pump: Option<JoinHandle<()>>,
}

impl ProfileSubscription {
    pub fn new(profile_id: Uuid, rx: mpsc::Receiver<ProfileChange>, pump: JoinHandle<()>) -> Self {
        Self {
            profile_id,
            rx,
            pump: Some(pump),
        }
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile_id
    }

    /// Next change, or `None` once the backend side has gone away.
    pub async fn recv(&mut self) -> Option<ProfileChange> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for ProfileSubscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            tracing::debug!("Released profile subscription for {}", self.profile_id);
        }
    }
}
