use log::{ debug, warn };
use std::sync::Arc;

use crate::api::ChatApi;
use crate::error::{ ChatError, ChatResult };
use crate::view::{ ConversationView, RefreshOutcome };

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Server-assigned id, when the backend reports one.
    pub message_id: Option<i64>,
    /// `None` when the follow-up refresh failed; the message itself was stored.
    pub refresh: Option<RefreshOutcome>,
}

/// Sends messages to the open conversation. Nothing is inserted locally: the
/// sender sees their message once the refresh that follows the send lands.
pub struct MessageComposer {
    api: Arc<dyn ChatApi>,
    view: ConversationView,
}

impl MessageComposer {
    pub fn new(api: Arc<dyn ChatApi>, view: ConversationView) -> Self {
        Self { api, view }
    }

    pub async fn submit(&self, content: &str) -> ChatResult<SubmitReceipt> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let peer = self.view.active_peer().await.ok_or(ChatError::NoActiveConversation)?;

        let message_id = self.api.send_message(self.view.user_id(), peer.id, content).await?;
        debug!("Sent message {:?} to {}", message_id, peer.id);

        let refresh = match self.view.refresh().await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Message to {} sent but refresh failed: {}", peer.id, e);
                None
            }
        };
        Ok(SubmitReceipt { message_id, refresh })
    }
}
