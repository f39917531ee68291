//! Conversation, message and notification endpoints.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::json;
use std::path::Path;

use super::{Access, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::models::{Conversation, ListResponse, Message, Notification, Participant};

pub struct ChatApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ChatApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn conversations(&self) -> ClientResult<Vec<Conversation>> {
        let list: ListResponse<Conversation> = self
            .client
            .call(
                Method::GET,
                "/chat/conversations/",
                Access::Bearer,
                "Failed to load conversations",
                |b| b,
            )
            .await?;
        Ok(list.into_vec())
    }

    pub async fn conversation(&self, id: u64) -> ClientResult<Conversation> {
        let path = format!("/chat/conversations/{}/", id);
        self.client
            .call(Method::GET, &path, Access::Bearer, "Failed to load conversation", |b| b)
            .await
    }

    pub async fn create_conversation(&self, participant_id: u64) -> ClientResult<Conversation> {
        self.client
            .call(
                Method::POST,
                "/chat/conversations/",
                Access::Bearer,
                "Failed to start conversation",
                |b| b.json(&json!({ "participant_id": participant_id })),
            )
            .await
    }

    pub async fn delete_conversation(&self, id: u64) -> ClientResult<()> {
        let path = format!("/chat/conversations/{}/", id);
        self.client
            .call_empty(Method::DELETE, &path, Access::Bearer, "Failed to delete conversation", |b| b)
            .await
    }

    pub async fn messages(&self, conversation_id: u64) -> ClientResult<Vec<Message>> {
        let path = format!("/chat/conversations/{}/messages/", conversation_id);
        let list: ListResponse<Message> = self
            .client
            .call(Method::GET, &path, Access::Bearer, "Failed to load messages", |b| b)
            .await?;
        Ok(list.into_vec())
    }

    /// Post a message as multipart, with an optional file attachment.
    pub async fn send_message(
        &self,
        conversation_id: u64,
        content: &str,
        attachment: Option<&Path>,
    ) -> ClientResult<Message> {
        let mut form = Form::new().text("content", content.to_string());
        if let Some(path) = attachment {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                ClientError::Storage(format!("Cannot read attachment {}: {}", path.display(), e))
            })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            form = form.part("file", Part::bytes(bytes).file_name(name));
        }

        let path = format!("/chat/conversations/{}/send_message/", conversation_id);
        self.client
            .call(Method::POST, &path, Access::Bearer, "Failed to send message", |b| {
                b.multipart(form)
            })
            .await
    }

    pub async fn mark_conversation_read(&self, conversation_id: u64) -> ClientResult<()> {
        let path = format!("/chat/conversations/{}/read/", conversation_id);
        self.client
            .call_empty(Method::POST, &path, Access::Bearer, "Failed to mark conversation read", |b| b)
            .await
    }

    pub async fn available_users(&self) -> ClientResult<Vec<Participant>> {
        let list: ListResponse<Participant> = self
            .client
            .call(
                Method::GET,
                "/chat/conversations/available_users/",
                Access::Bearer,
                "Failed to load users",
                |b| b,
            )
            .await?;
        Ok(list.into_vec())
    }

    pub async fn notifications(&self) -> ClientResult<Vec<Notification>> {
        let list: ListResponse<Notification> = self
            .client
            .call(
                Method::GET,
                "/chat/notifications/",
                Access::Bearer,
                "Failed to load notifications",
                |b| b,
            )
            .await?;
        Ok(list.into_vec())
    }

    pub async fn mark_notification_read(&self, id: u64) -> ClientResult<()> {
        let path = format!("/chat/notifications/{}/mark_as_read/", id);
        self.client
            .call_empty(Method::POST, &path, Access::Bearer, "Failed to mark notification read", |b| b)
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        self.client
            .call_empty(
                Method::POST,
                "/chat/notifications/mark_all_as_read/",
                Access::Bearer,
                "Failed to mark notifications read",
                |b| b,
            )
            .await
    }
}
