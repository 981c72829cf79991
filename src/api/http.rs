use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, Response, StatusCode, header::{ HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION } };
use serde::de::DeserializeOwned;
use url::Url;

use super::ChatApi;
use crate::config::{ ChatConfig, SessionContext };
use crate::error::{ ChatError, ChatResult };
use crate::models::chat::{ Conversation, Message, UserId };
use crate::models::envelope::{
    self,
    Ack,
    ChatsPayload,
    HistoryPayload,
    MarkReadRequest,
    SendRequest,
    SentPayload,
};

const CHATS_ROUTE: &str = "mensajes/chats";
const HISTORY_ROUTE: &str = "mensajes/conversacion";
const SEND_ROUTE: &str = "mensajes/enviar";
const MARK_READ_ROUTE: &str = "mensajes/marcar-leidos";

pub struct HttpChatApi {
    http: HttpClient,
    base_url: Url,
}

impl HttpChatApi {
    pub fn new(config: &ChatConfig, session: &SessionContext) -> ChatResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", session.credential())).map_err(
            |e| ChatError::Config(format!("Invalid credential format: {}", e))
        )?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    fn endpoint(&self, route: &str) -> ChatResult<Url> {
        self.base_url
            .join(route)
            .map_err(|e| ChatError::Config(format!("Cannot build URL for '{}': {}", route, e)))
    }

    async fn get<T: DeserializeOwned>(&self, route: &str, query: &[(&str, String)]) -> ChatResult<T> {
        let url = self.endpoint(route)?;
        debug!("GET {} {:?}", url, query);
        let resp = self.http.get(url).query(query).send().await?;
        decode(resp).await
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> ChatResult<T>
        where B: serde::Serialize + Sync, T: DeserializeOwned
    {
        let url = self.endpoint(route)?;
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ChatResult<T> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ChatError::AuthRequired);
    }

    let failure = resp.error_for_status_ref().err();
    if let Some(e) = failure {
        // Some endpoints answer errors with a proper envelope; prefer its reason.
        let body = resp.text().await.unwrap_or_default();
        return match envelope::open::<Ack>(&body) {
            Err(ChatError::Rejected(reason)) => Err(ChatError::Rejected(reason)),
            _ => Err(ChatError::Network(e)),
        };
    }

    let body = resp.text().await?;
    envelope::open(&body)
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_conversations(&self, user_id: UserId) -> ChatResult<Vec<Conversation>> {
        let payload: ChatsPayload = self.get(CHATS_ROUTE, &[("usuario_id", user_id.to_string())]).await?;
        Ok(payload.chats)
    }

    async fn fetch_history(&self, user_id: UserId, peer_id: UserId) -> ChatResult<Vec<Message>> {
        let query = [
            ("usuario1", user_id.to_string()),
            ("usuario2", peer_id.to_string()),
        ];
        let payload: HistoryPayload = self.get(HISTORY_ROUTE, &query).await?;
        Ok(payload.mensajes)
    }

    async fn send_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str
    ) -> ChatResult<Option<i64>> {
        let req = SendRequest {
            remitente_id: sender_id,
            destinatario_id: receiver_id,
            contenido: content,
        };
        let payload: SentPayload = self.post(SEND_ROUTE, &req).await?;
        Ok(payload.id)
    }

    async fn mark_read(&self, sender_id: UserId, receiver_id: UserId) -> ChatResult<()> {
        let req = MarkReadRequest {
            remitente_id: sender_id,
            destinatario_id: receiver_id,
        };
        let _: Ack = self.post(MARK_READ_ROUTE, &req).await?;
        Ok(())
    }
}
