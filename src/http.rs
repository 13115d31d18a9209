//! HTTP implementation of the outbound action gateway.
//!
//! Since `ureq` is blocking, every request is wrapped in
//! `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::gateway::{AttachmentRef, ChatGateway, GatewayError};
use crate::types::conversation::ConversationId;
use crate::types::message::Message;
use crate::types::user::{GroupInfo, UserInfo};

pub struct UreqGateway {
    base_url: String,
    token: String,
}

impl UreqGateway {
    /// `base_url` is the HTTP endpoint of the chat server, `token` the bearer
    /// token obtained at login.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let auth = format!("Bearer {}", self.token);
        debug!(target: "Gateway", "GET {url}");

        let body = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, GatewayError> {
            let response = ureq::get(&url)
                .header("Authorization", &auth)
                .call()
                .map_err(map_ureq)?;
            response
                .into_body()
                .read_to_vec()
                .map_err(|e| GatewayError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))??;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let auth = format!("Bearer {}", self.token);
        let request_body = serde_json::to_vec(&payload)?;
        debug!(target: "Gateway", "POST {url}");

        let body = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, GatewayError> {
            let response = ureq::post(&url)
                .header("Authorization", &auth)
                .header("Content-Type", "application/json")
                .send(&request_body[..])
                .map_err(map_ureq)?;
            response
                .into_body()
                .read_to_vec()
                .map_err(|e| GatewayError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))??;

        Ok(serde_json::from_slice(&body)?)
    }
}

fn map_ureq(error: ureq::Error) -> GatewayError {
    match error {
        ureq::Error::StatusCode(code) => GatewayError::Status(code),
        other => GatewayError::Transport(other.to_string()),
    }
}

/// Query path selecting one conversation's history.
fn history_path(conversation: &ConversationId) -> String {
    let param = if conversation.is_group() {
        "group_id"
    } else {
        "recipient_id"
    };
    format!(
        "/messages?{param}={}",
        urlencoding::encode(conversation.key())
    )
}

#[async_trait]
impl ChatGateway for UreqGateway {
    async fn fetch_history(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, GatewayError> {
        self.get_json(&history_path(conversation)).await
    }

    async fn send_message(
        &self,
        conversation: &ConversationId,
        content: Option<String>,
        attachment: Option<AttachmentRef>,
    ) -> Result<Message, GatewayError> {
        let mut payload = json!({
            "content": content.unwrap_or_default(),
        });
        match conversation {
            ConversationId::Peer(id) => payload["recipient_id"] = json!(id),
            ConversationId::Group(id) => payload["group_id"] = json!(id),
        }
        if let Some(attachment) = attachment {
            payload["file_url"] = json!(attachment.url);
            payload["file_name"] = json!(attachment.name);
            payload["file_size"] = json!(attachment.size);
        }
        self.post_json("/messages", payload).await
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, GatewayError> {
        self.get_json("/users").await
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>, GatewayError> {
        self.get_json("/groups").await
    }

    async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        member_ids: &[String],
    ) -> Result<GroupInfo, GatewayError> {
        self.post_json(
            "/groups",
            json!({
                "name": name,
                "description": description,
                "member_ids": member_ids,
            }),
        )
        .await
    }
}
