use log::{ debug, warn };
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::ChatApi;
use crate::models::chat::UserId;

#[derive(Clone)]
pub struct ReadTracker {
    api: Arc<dyn ChatApi>,
    user_id: UserId,
}

impl ReadTracker {
    pub fn new(api: Arc<dyn ChatApi>, user_id: UserId) -> Self {
        Self { api, user_id }
    }

    /// Flags everything `peer_id` sent to the current user as read. Runs in the
    /// background; failures are logged and dropped. The handle is only useful
    /// to callers that want to wait for completion.
    pub fn mark_read(&self, peer_id: UserId) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let user_id = self.user_id;
        tokio::spawn(async move {
            match api.mark_read(peer_id, user_id).await {
                Ok(()) => debug!("Marked messages from {} as read", peer_id),
                Err(e) => warn!("Could not mark messages from {} as read: {}", peer_id, e),
            }
        })
    }
}
