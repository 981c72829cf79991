use log::debug;
use std::sync::Arc;

use crate::api::ChatApi;
use crate::error::ChatResult;
use crate::models::chat::{ Conversation, UserId };

/// Conversation list of the signed-in user. Keeps only the most recent
/// successful fetch; every call to `list_conversations` goes to the backend.
pub struct ConversationDirectory {
    api: Arc<dyn ChatApi>,
    user_id: UserId,
    latest: Option<Vec<Conversation>>,
}

impl ConversationDirectory {
    pub fn new(api: Arc<dyn ChatApi>, user_id: UserId) -> Self {
        Self { api, user_id, latest: None }
    }

    /// Replaces the list wholesale. On failure the previous list is kept as is.
    pub async fn list_conversations(&mut self) -> ChatResult<&[Conversation]> {
        let conversations = self.api.list_conversations(self.user_id).await?;
        debug!("Fetched {} conversations for user {}", conversations.len(), self.user_id);
        Ok(self.latest.insert(conversations).as_slice())
    }

    pub fn latest(&self) -> Option<&[Conversation]> {
        self.latest.as_deref()
    }

    pub fn find(&self, peer_id: UserId) -> Option<&Conversation> {
        self.latest.as_ref()?.iter().find(|c| c.peer_id == peer_id)
    }

    /// Sum of unread counts over the last successful fetch.
    pub fn unread_total(&self) -> u32 {
        self.latest
            .iter()
            .flatten()
            .map(|c| c.unread_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{ conversation, Call, Op, RecordingApi };

    #[tokio::test]
    async fn keeps_server_order() {
        let api = RecordingApi::new();
        api.set_conversations(vec![conversation(3, "Nuria", 1), conversation(8, "Pau", 0)]);
        let mut directory = ConversationDirectory::new(api.clone(), 1);

        let peers: Vec<UserId> = directory
            .list_conversations().await
            .unwrap()
            .iter()
            .map(|c| c.peer_id)
            .collect();
        assert_eq!(peers, vec![3, 8]);
        assert_eq!(api.calls(), vec![Call::ListConversations(1)]);
    }

    #[tokio::test]
    async fn failure_leaves_previous_list() {
        let api = RecordingApi::new();
        api.set_conversations(vec![conversation(3, "Nuria", 2)]);
        let mut directory = ConversationDirectory::new(api.clone(), 1);
        directory.list_conversations().await.unwrap();

        api.set_conversations(vec![]);
        api.fail(Op::List, "timeout");
        let err = directory.list_conversations().await.unwrap_err();
        assert!(err.is_network());

        let latest = directory.latest().unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].peer_id, 3);
    }

    #[tokio::test]
    async fn every_listing_refetches_and_replaces() {
        let api = RecordingApi::new();
        api.set_conversations(vec![conversation(3, "Nuria", 2), conversation(5, "Joan", 4)]);
        let mut directory = ConversationDirectory::new(api.clone(), 1);
        directory.list_conversations().await.unwrap();
        assert_eq!(directory.unread_total(), 6);

        api.set_conversations(vec![conversation(5, "Joan", 1)]);
        directory.list_conversations().await.unwrap();
        assert_eq!(directory.unread_total(), 1);
        assert!(directory.find(3).is_none());
        assert_eq!(directory.find(5).map(|c| c.peer_name.as_str()), Some("Joan"));
        assert_eq!(api.calls().len(), 2);
    }

    #[test]
    fn empty_before_first_fetch() {
        let directory = ConversationDirectory::new(RecordingApi::new(), 1);
        assert!(directory.latest().is_none());
        assert_eq!(directory.unread_total(), 0);
    }
}
