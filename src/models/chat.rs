use chrono::{ DateTime, Utc };
use serde::Deserialize;
use super::wire;

pub type UserId = i64;

/// One row of the conversation list. The server keeps it ordered most recent first.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Conversation {
    #[serde(rename = "otro_usuario_id", deserialize_with = "wire::id")]
    pub peer_id: UserId,
    #[serde(rename = "otro_usuario_nombre", default)]
    pub peer_name: String,
    #[serde(rename = "ultimo_mensaje", default)]
    pub last_message: String,
    #[serde(rename = "fecha_ultimo_mensaje", deserialize_with = "wire::timestamp")]
    pub last_message_at: DateTime<Utc>,
    #[serde(rename = "no_leidos", default, deserialize_with = "wire::count")]
    pub unread_count: u32,
    #[serde(rename = "alojamiento_id", default, deserialize_with = "wire::optional_id")]
    pub listing_id: Option<i64>,
}

impl Conversation {
    pub fn peer(&self) -> Peer {
        Peer { id: self.peer_id, name: self.peer_name.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "wire::id")]
    pub id: i64,
    #[serde(rename = "remitente_id", deserialize_with = "wire::id")]
    pub sender_id: UserId,
    #[serde(rename = "destinatario_id", deserialize_with = "wire::id")]
    pub receiver_id: UserId,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "fecha_envio", deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "leido", default, deserialize_with = "wire::flag")]
    pub read: bool,
}

impl Message {
    pub fn is_from(&self, user_id: UserId) -> bool {
        self.sender_id == user_id
    }
}

/// Ascending by creation time; ids break ties so equal timestamps keep send order.
pub fn sort_for_display(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    pub id: UserId,
    pub name: String,
}

impl Peer {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// What a renderer needs to draw the open conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationSnapshot {
    pub peer: Peer,
    pub messages: Vec<Message>,
}
