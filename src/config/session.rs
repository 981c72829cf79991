use std::fmt;

use crate::cli::Args;
use crate::error::{ ChatError, ChatResult };
use crate::models::chat::UserId;

/// Identity and credential of the signed-in user, built once per session.
#[derive(Clone)]
pub struct SessionContext {
    pub user_id: UserId,
    pub user_name: String,
    credential: String,
}

impl SessionContext {
    pub fn new(user_id: UserId, user_name: impl Into<String>, credential: impl Into<String>) -> ChatResult<Self> {
        let credential = credential.into();
        if credential.trim().is_empty() {
            return Err(ChatError::AuthRequired);
        }
        Ok(Self { user_id, user_name: user_name.into(), credential })
    }

    pub fn from_args(args: &Args) -> ChatResult<Self> {
        let token = args.auth_token.as_deref().ok_or(ChatError::AuthRequired)?;
        Self::new(args.user_id, args.user_name.clone(), token)
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("credential", &"<redacted>")
            .finish()
    }
}
