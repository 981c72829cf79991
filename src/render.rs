use chrono::{ DateTime, Utc };
use std::io::{ self, Write };

use crate::error::ChatError;
use crate::format::{ escape_for_display, preview, relative_time_with, sanitize_for_terminal };
use crate::models::chat::{ Conversation, ConversationSnapshot, UserId };

const PREVIEW_CHARS: usize = 48;
const CONTINUATION: &str = "\n      ";

/// Escaped for markup and stripped of terminal control sequences.
fn safe(text: &str) -> String {
    sanitize_for_terminal(&escape_for_display(text))
}

fn one_line(text: &str) -> String {
    safe(text).replace('\n', " ")
}

/// Rendering sink for the messaging data. Implementations must escape every
/// field another user controls.
pub trait Renderer {
    fn conversations(&mut self, conversations: &[Conversation], unread_total: u32) -> io::Result<()>;
    fn conversation(&mut self, snapshot: &ConversationSnapshot) -> io::Result<()>;
    fn closed(&mut self) -> io::Result<()>;
    fn notice(&mut self, text: &str) -> io::Result<()>;
    fn error(&mut self, err: &ChatError) -> io::Result<()>;
}

pub struct TerminalRenderer<W: Write> {
    out: W,
    user_id: UserId,
    date_format: String,
    clock: fn() -> DateTime<Utc>,
    last_shown: Option<ConversationSnapshot>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, user_id: UserId, date_format: impl Into<String>) -> Self {
        Self {
            out,
            user_id,
            date_format: date_format.into(),
            clock: Utc::now,
            last_shown: None,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn when(&self, at: DateTime<Utc>) -> String {
        relative_time_with(at, (self.clock)(), &self.date_format)
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn conversations(&mut self, conversations: &[Conversation], unread_total: u32) -> io::Result<()> {
        if conversations.is_empty() {
            writeln!(self.out, "No conversations yet.")?;
            return self.out.flush();
        }
        writeln!(self.out, "Conversations ({} unread):", unread_total)?;
        for c in conversations {
            let badge = if c.unread_count > 0 { format!(" [{}]", c.unread_count) } else { String::new() };
            let listing = c.listing_id.map(|id| format!(" · listing #{}", id)).unwrap_or_default();
            writeln!(
                self.out,
                "  #{:<6} {}{}{} · {}\n          {}",
                c.peer_id,
                one_line(&c.peer_name),
                badge,
                listing,
                self.when(c.last_message_at),
                one_line(&preview(&c.last_message, PREVIEW_CHARS))
            )?;
        }
        self.out.flush()
    }

    /// Skips snapshots identical to the last one drawn, so quiet polls print nothing.
    fn conversation(&mut self, snapshot: &ConversationSnapshot) -> io::Result<()> {
        if self.last_shown.as_ref() == Some(snapshot) {
            return Ok(());
        }
        let peer_name = one_line(&snapshot.peer.name);
        writeln!(self.out, "── {} (#{}) ──", peer_name, snapshot.peer.id)?;
        if snapshot.messages.is_empty() {
            writeln!(self.out, "  (no messages)")?;
        }
        for m in &snapshot.messages {
            let who = if m.is_from(self.user_id) { "you".to_string() } else { peer_name.clone() };
            writeln!(
                self.out,
                "  [{}] {}: {}",
                self.when(m.created_at),
                who,
                // Continuation lines are indented so they cannot pass for a new sender.
                safe(&m.content).replace('\n', CONTINUATION)
            )?;
        }
        self.last_shown = Some(snapshot.clone());
        self.out.flush()
    }

    /// Prints only when a conversation is on screen, so an explicit close and
    /// the update that follows it produce one line.
    fn closed(&mut self) -> io::Result<()> {
        if self.last_shown.take().is_none() {
            return Ok(());
        }
        writeln!(self.out, "Conversation closed.")?;
        self.out.flush()
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    fn error(&mut self, err: &ChatError) -> io::Result<()> {
        match err {
            ChatError::AuthRequired => writeln!(self.out, "! Session expired. Sign in again.")?,
            ChatError::EmptyMessage => writeln!(self.out, "! Write something first.")?,
            other => writeln!(self.out, "! {}", other)?,
        }
        self.out.flush()
    }
}
