mod http;
#[cfg(test)]
pub mod testing;

pub use self::http::HttpChatApi;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ ChatConfig, SessionContext };
use crate::error::ChatResult;
use crate::models::chat::{ Conversation, Message, UserId };

/// The four messaging operations the backend exposes.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `obtener_chats`: conversation summaries, most recent first.
    async fn list_conversations(&self, user_id: UserId) -> ChatResult<Vec<Conversation>>;

    /// `obtener_conversacion`: the full history between two users.
    async fn fetch_history(&self, user_id: UserId, peer_id: UserId) -> ChatResult<Vec<Message>>;

    /// `enviar`: persists one message. Returns the new message id when the server reports it.
    async fn send_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str
    ) -> ChatResult<Option<i64>>;

    /// `marcar_leidos`: flags every message from `sender_id` to `receiver_id` as read.
    async fn mark_read(&self, sender_id: UserId, receiver_id: UserId) -> ChatResult<()>;
}

pub fn new_client(config: &ChatConfig, session: &SessionContext) -> ChatResult<Arc<dyn ChatApi>> {
    let client = HttpChatApi::new(config, session)?;
    Ok(Arc::new(client))
}
