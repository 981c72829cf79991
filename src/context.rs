use log::info;
use std::sync::Arc;

use crate::api::{ self, ChatApi };
use crate::composer::MessageComposer;
use crate::config::{ ChatConfig, SessionContext };
use crate::directory::ConversationDirectory;
use crate::error::ChatResult;
use crate::models::chat::UserId;
use crate::view::ConversationView;

/// Everything one signed-in session needs for messaging. Built once and
/// handed to the UI adapter; nothing here is global.
pub struct ChatContext {
    pub config: ChatConfig,
    pub session: SessionContext,
    pub directory: ConversationDirectory,
    pub view: ConversationView,
    pub composer: MessageComposer,
}

impl ChatContext {
    pub fn new(config: ChatConfig, session: SessionContext, api: Arc<dyn ChatApi>) -> Self {
        let user_id = session.user_id;
        let directory = ConversationDirectory::new(Arc::clone(&api), user_id);
        let view = ConversationView::new(
            Arc::clone(&api),
            user_id,
            config.poll_interval,
            config.discard_stale_refreshes
        );
        let composer = MessageComposer::new(api, view.clone());

        Self { config, session, directory, view, composer }
    }

    /// Builds the HTTP-backed context.
    pub fn connect(config: ChatConfig, session: SessionContext) -> ChatResult<Self> {
        let client = api::new_client(&config, &session)?;
        info!("Chat client ready for user {} at {}", session.user_id, config.api_base_url);
        Ok(Self::new(config, session, client))
    }

    pub fn user_id(&self) -> UserId {
        self.session.user_id
    }
}
