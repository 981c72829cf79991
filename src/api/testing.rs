//! Scripted in-memory backend for exercising the messaging components.

use async_trait::async_trait;
use chrono::{ DateTime, Duration, TimeZone, Utc };
use std::collections::{ HashMap, VecDeque };
use std::sync::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

use super::ChatApi;
use crate::error::{ ChatError, ChatResult };
use crate::models::chat::{ Conversation, Message, UserId };

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListConversations(UserId),
    FetchHistory(UserId, UserId),
    Send {
        from: UserId,
        to: UserId,
        content: String,
    },
    MarkRead {
        from: UserId,
        to: UserId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    History,
    Send,
    MarkRead,
}

#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    conversations: Mutex<Vec<Conversation>>,
    histories: Mutex<HashMap<UserId, Vec<Message>>>,
    failures: Mutex<HashMap<Op, String>>,
    gates: Mutex<HashMap<UserId, VecDeque<Arc<Notify>>>>,
    session_expired: Mutex<bool>,
    next_id: Mutex<i64>,
}

/// Lets spawned tasks run after a paused-clock `advance`.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap() + Duration::minutes(minute)
}

pub fn message(id: i64, from: UserId, to: UserId, content: &str) -> Message {
    Message {
        id,
        sender_id: from,
        receiver_id: to,
        content: content.to_string(),
        created_at: at(id),
        read: false,
    }
}

pub fn conversation(peer_id: UserId, name: &str, unread: u32) -> Conversation {
    Conversation {
        peer_id,
        peer_name: name.to_string(),
        last_message: format!("last from {}", name),
        last_message_at: at(peer_id),
        unread_count: unread,
        listing_id: None,
    }
}

impl RecordingApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(1000),
            ..Self::default()
        })
    }

    pub fn set_conversations(&self, conversations: Vec<Conversation>) {
        *self.conversations.lock().unwrap() = conversations;
    }

    pub fn set_history(&self, peer_id: UserId, messages: Vec<Message>) {
        self.histories.lock().unwrap().insert(peer_id, messages);
    }

    pub fn fail(&self, op: Op, reason: &str) {
        self.failures.lock().unwrap().insert(op, reason.to_string());
    }

    /// Every later call fails as a rejected credential would.
    pub fn expire_session(&self) {
        *self.session_expired.lock().unwrap() = true;
    }

    pub fn recover(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    /// Holds the next history response for `peer_id` until the returned gate is notified.
    /// The history is captured when the request arrives, not when it is released.
    pub fn gate_history(&self, peer_id: UserId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().entry(peer_id).or_default().push_back(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn history_calls(&self, peer_id: UserId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::FetchHistory(_, p) if *p == peer_id))
            .count()
    }

    pub fn mark_read_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::MarkRead { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> ChatResult<()> {
        if *self.session_expired.lock().unwrap() {
            return Err(ChatError::AuthRequired);
        }
        match self.failures.lock().unwrap().get(&op) {
            Some(reason) => Err(ChatError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn list_conversations(&self, user_id: UserId) -> ChatResult<Vec<Conversation>> {
        self.record(Call::ListConversations(user_id));
        self.check(Op::List)?;
        Ok(self.conversations.lock().unwrap().clone())
    }

    async fn fetch_history(&self, user_id: UserId, peer_id: UserId) -> ChatResult<Vec<Message>> {
        self.record(Call::FetchHistory(user_id, peer_id));
        let captured = self.check(Op::History).map(|_| {
            self.histories.lock().unwrap().get(&peer_id).cloned().unwrap_or_default()
        });
        let gate = self.gates
            .lock()
            .unwrap()
            .get_mut(&peer_id)
            .and_then(|queue| queue.pop_front());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        captured
    }

    async fn send_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str
    ) -> ChatResult<Option<i64>> {
        self.record(Call::Send {
            from: sender_id,
            to: receiver_id,
            content: content.to_string(),
        });
        self.check(Op::Send)?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.histories
            .lock()
            .unwrap()
            .entry(receiver_id)
            .or_default()
            .push(message(id, sender_id, receiver_id, content));
        Ok(Some(id))
    }

    async fn mark_read(&self, sender_id: UserId, receiver_id: UserId) -> ChatResult<()> {
        self.record(Call::MarkRead {
            from: sender_id,
            to: receiver_id,
        });
        self.check(Op::MarkRead)
    }
}
