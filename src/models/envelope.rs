use serde::de::DeserializeOwned;
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

use super::chat::{ Conversation, Message, UserId };
use super::wire;
use crate::error::{ ChatError, ChatResult };

#[derive(Deserialize, Debug)]
struct Header {
    #[serde(deserialize_with = "wire::flag")]
    exito: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatsPayload {
    #[serde(default)]
    pub chats: Vec<Conversation>,
}

#[derive(Deserialize, Debug)]
pub struct HistoryPayload {
    #[serde(default)]
    pub mensajes: Vec<Message>,
}

#[derive(Deserialize, Debug)]
pub struct SentPayload {
    #[serde(default, deserialize_with = "wire::optional_id")]
    pub id: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct Ack {}

#[derive(Serialize, Debug)]
pub struct SendRequest<'a> {
    pub remitente_id: UserId,
    pub destinatario_id: UserId,
    pub contenido: &'a str,
}

#[derive(Serialize, Debug)]
pub struct MarkReadRequest {
    pub remitente_id: UserId,
    pub destinatario_id: UserId,
}

/// Unwraps `{ "exito": true, ...payload }`. A `false` flag becomes
/// `ChatError::Rejected` carrying the server's `error` text.
pub fn open<T: DeserializeOwned>(body: &str) -> ChatResult<T> {
    let value: JsonValue = serde_json::from_str(body)?;
    let header: Header = serde_json::from_value(value.clone())?;
    if !header.exito {
        let reason = header.error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "unspecified server error".to_string());
        return Err(ChatError::Rejected(reason));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_successful_payload() {
        let body =
            r#"{"exito": true, "mensajes": [{"id": 1, "remitente_id": 2, "destinatario_id": 3,
            "contenido": "hi", "fecha_envio": "2026-10-16 09:00:00", "leido": 0}]}"#;
        let payload: HistoryPayload = open(body).unwrap();
        assert_eq!(payload.mensajes.len(), 1);
        assert_eq!(payload.mensajes[0].content, "hi");
    }

    #[test]
    fn failure_flag_carries_server_reason() {
        let err = open::<Ack>(r#"{"exito": false, "error": "Usuario no válido"}"#).unwrap_err();
        match err {
            ChatError::Rejected(reason) => assert_eq!(reason, "Usuario no válido"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_flag_is_decode_error() {
        let err = open::<Ack>(r#"{"chats": []}"#).unwrap_err();
        assert!(matches!(err, ChatError::Decode(_)));
    }

    #[test]
    fn html_error_page_is_decode_error() {
        let err = open::<ChatsPayload>("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ChatError::Decode(_)));
        assert!(err.is_network());
    }
}
