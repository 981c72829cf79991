use futures::future::{ BoxFuture, FutureExt };
use log::{ debug, info, warn };
use std::ops::ControlFlow;
use std::sync::{ Arc, Weak };
use std::time::Duration;
use tokio::sync::{ watch, Mutex };

use crate::api::ChatApi;
use crate::error::{ ChatError, ChatResult };
use crate::models::chat::{ sort_for_display, ConversationSnapshot, Message, Peer, UserId };
use crate::poller::Poller;
use crate::read_tracker::ReadTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Discarded(DiscardReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The conversation was closed before the response arrived.
    Closed,
    /// Another conversation (or a fresh opening of the same one) replaced it.
    Superseded,
    /// A refresh issued later has already been applied.
    Stale,
}

/// Identifies one refresh request: which opening it belongs to and its order.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    seq: u64,
    peer_id: UserId,
}

struct ActiveConversation {
    peer: Peer,
    epoch: u64,
    messages: Vec<Message>,
    last_applied_seq: u64,
    // Lives and dies with the active conversation.
    poller: Poller,
}

#[derive(Default)]
struct ViewState {
    active: Option<ActiveConversation>,
    epoch: u64,
    next_seq: u64,
}

impl ViewState {
    fn ticket(&mut self, epoch: Option<u64>) -> Option<Ticket> {
        let active = self.active.as_ref()?;
        if epoch.is_some_and(|e| e != active.epoch) {
            return None;
        }
        let ticket = Ticket { epoch: active.epoch, seq: self.next_seq + 1, peer_id: active.peer.id };
        self.next_seq += 1;
        Some(ticket)
    }

    fn snapshot(&self) -> Option<ConversationSnapshot> {
        self.active.as_ref().map(|active| ConversationSnapshot {
            peer: active.peer.clone(),
            messages: active.messages.clone(),
        })
    }
}

struct Shared {
    api: Arc<dyn ChatApi>,
    read_tracker: ReadTracker,
    user_id: UserId,
    poll_interval: Duration,
    discard_stale: bool,
    state: Mutex<ViewState>,
    updates: watch::Sender<Option<ConversationSnapshot>>,
}

/// The single open conversation and its polling. Cloning yields another
/// handle to the same view.
#[derive(Clone)]
pub struct ConversationView {
    shared: Arc<Shared>,
}

impl ConversationView {
    pub fn new(
        api: Arc<dyn ChatApi>,
        user_id: UserId,
        poll_interval: Duration,
        discard_stale: bool
    ) -> Self {
        let (updates, _) = watch::channel(None);
        let shared = Shared {
            read_tracker: ReadTracker::new(Arc::clone(&api), user_id),
            api,
            user_id,
            poll_interval,
            discard_stale,
            state: Mutex::new(ViewState::default()),
            updates,
        };
        Self { shared: Arc::new(shared) }
    }

    /// Opens a conversation with `peer`, replacing whatever was open. The old
    /// poller is cancelled before the new one exists. Loads the history, marks
    /// the peer's messages read once, and polls every interval from then on.
    ///
    /// A failed initial load is returned but leaves the conversation open.
    pub async fn select_conversation(&self, peer: Peer) -> ChatResult<RefreshOutcome> {
        let peer_id = peer.id;
        let ticket = {
            let mut state = self.shared.state.lock().await;
            if let Some(previous) = state.active.take() {
                info!("Leaving conversation with {}", previous.peer.id);
                drop(previous);
            }
            state.epoch += 1;
            let epoch = state.epoch;
            let poller = Poller::start(
                self.shared.poll_interval,
                tick_fn(Arc::downgrade(&self.shared), epoch)
            );
            state.active = Some(ActiveConversation {
                peer,
                epoch,
                messages: Vec::new(),
                last_applied_seq: 0,
                poller,
            });
            self.shared.updates.send_replace(state.snapshot());
            state.next_seq += 1;
            Ticket { epoch, seq: state.next_seq, peer_id }
        };
        info!("Opened conversation with {}", peer_id);

        let outcome = self.shared.fetch_and_apply(ticket).await;
        self.shared.read_tracker.mark_read(peer_id);
        outcome
    }

    /// Out-of-cycle refresh of the open conversation.
    pub async fn refresh(&self) -> ChatResult<RefreshOutcome> {
        let ticket = self.shared.state
            .lock().await
            .ticket(None)
            .ok_or(ChatError::NoActiveConversation)?;
        self.shared.fetch_and_apply(ticket).await
    }

    /// Closes the open conversation and stops its poller. Returns whether one was open.
    pub async fn close(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        match state.active.take() {
            Some(previous) => {
                info!("Closed conversation with {}", previous.peer.id);
                drop(previous);
                self.shared.updates.send_replace(None);
                true
            }
            None => false,
        }
    }

    pub async fn active_peer(&self) -> Option<Peer> {
        let state = self.shared.state.lock().await;
        state.active.as_ref().map(|active| active.peer.clone())
    }

    pub async fn is_polling(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.active.as_ref().is_some_and(|active| !active.poller.is_cancelled())
    }

    /// Last published state, without waiting on in-flight work.
    pub fn snapshot(&self) -> Option<ConversationSnapshot> {
        self.shared.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ConversationSnapshot>> {
        self.shared.updates.subscribe()
    }

    pub fn user_id(&self) -> UserId {
        self.shared.user_id
    }
}

impl Shared {
    async fn fetch_and_apply(&self, ticket: Ticket) -> ChatResult<RefreshOutcome> {
        debug!("Refresh #{} for peer {} (epoch {})", ticket.seq, ticket.peer_id, ticket.epoch);
        let mut messages = self.api.fetch_history(self.user_id, ticket.peer_id).await?;
        sort_for_display(&mut messages);

        let mut state = self.state.lock().await;
        let Some(active) = state.active.as_mut() else {
            debug!("Discarding refresh #{}: conversation closed", ticket.seq);
            return Ok(RefreshOutcome::Discarded(DiscardReason::Closed));
        };
        if active.epoch != ticket.epoch {
            debug!("Discarding refresh #{}: peer {} is no longer open", ticket.seq, ticket.peer_id);
            return Ok(RefreshOutcome::Discarded(DiscardReason::Superseded));
        }
        if self.discard_stale && ticket.seq < active.last_applied_seq {
            debug!(
                "Discarding refresh #{}: #{} already applied",
                ticket.seq,
                active.last_applied_seq
            );
            return Ok(RefreshOutcome::Discarded(DiscardReason::Stale));
        }

        active.messages = messages;
        active.last_applied_seq = active.last_applied_seq.max(ticket.seq);
        self.updates.send_replace(state.snapshot());
        Ok(RefreshOutcome::Applied)
    }

    async fn tick(&self, epoch: u64) -> ControlFlow<()> {
        let Some(ticket) = self.state.lock().await.ticket(Some(epoch)) else {
            return ControlFlow::Break(());
        };
        match self.fetch_and_apply(ticket).await {
            Ok(RefreshOutcome::Discarded(DiscardReason::Closed | DiscardReason::Superseded)) =>
                ControlFlow::Break(()),
            Ok(_) => ControlFlow::Continue(()),
            Err(ChatError::AuthRequired) => {
                warn!("Session expired while polling peer {}; closing the conversation", ticket.peer_id);
                self.end(epoch).await;
                ControlFlow::Break(())
            }
            Err(e) => {
                warn!("Polling peer {} failed: {}", ticket.peer_id, e);
                ControlFlow::Continue(())
            }
        }
    }

    /// Closes the conversation if `epoch` is still the open one.
    async fn end(&self, epoch: u64) {
        let mut state = self.state.lock().await;
        if state.active.as_ref().is_some_and(|active| active.epoch == epoch) {
            state.active = None;
            self.updates.send_replace(None);
        }
    }
}

fn tick_fn(
    shared: Weak<Shared>,
    epoch: u64
) -> impl FnMut() -> BoxFuture<'static, ControlFlow<()>> + Send + 'static {
    move || {
        let shared = shared.clone();
        (async move {
            match shared.upgrade() {
                Some(shared) => shared.tick(epoch).await,
                None => ControlFlow::Break(()),
            }
        }).boxed()
    }
}
