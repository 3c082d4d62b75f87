//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, ChatApi, ConversationList, CreateReply, SendReply};
use crate::core::model::{Conversation, Message};
use crate::core::state::{App, UiSettings};

/// Creates an App with default settings and nothing loaded.
pub fn test_app() -> App {
    App::new(UiSettings::default())
}

/// An App whose cache holds `entries`, with `active` selected and painted.
pub fn app_with(entries: &[(&str, Conversation)], active: Option<&str>) -> App {
    let mut app = test_app();
    app.conversations = cache(entries);
    app.active_conversation_id = active.map(str::to_string);
    app.bootstrapped = true;
    if let Some(conversation) = app.active_conversation().cloned() {
        app.header_title = conversation.title;
        app.thread = conversation.messages;
    }
    app
}

pub fn conversation(title: &str, messages: &[Message]) -> Conversation {
    Conversation {
        title: title.to_string(),
        messages: messages.to_vec(),
    }
}

pub fn cache(entries: &[(&str, Conversation)]) -> BTreeMap<String, Conversation> {
    entries
        .iter()
        .map(|(id, c)| (id.to_string(), c.clone()))
        .collect()
}

pub fn list(entries: &[(&str, Conversation)], active: Option<&str>) -> ConversationList {
    ConversationList {
        conversations: cache(entries),
        active: active.map(str::to_string),
    }
}

/// Answers every call with canned data after an optional delay.
pub struct StubApi {
    pub delay: Duration,
}

impl StubApi {
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl ChatApi for StubApi {
    async fn send_message(
        &self,
        _conversation_id: Option<&str>,
        message: &str,
    ) -> Result<SendReply, ApiError> {
        self.pause().await;
        Ok(SendReply {
            reply: format!("echo: {message}"),
            title: None,
            conversation: None,
        })
    }

    async fn create_conversation(&self) -> Result<CreateReply, ApiError> {
        self.pause().await;
        Ok(CreateReply {
            id: "stub".to_string(),
            conversation: Conversation::empty(),
        })
    }

    async fn clear_conversation(&self, _id: &str) -> Result<Conversation, ApiError> {
        self.pause().await;
        Ok(Conversation::empty())
    }

    async fn fetch_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        self.pause().await;
        Ok(Conversation::with_title(id))
    }

    async fn list_conversations(&self) -> Result<ConversationList, ApiError> {
        self.pause().await;
        Ok(list(&[], None))
    }

    async fn delete_conversation(&self, _id: &str) -> Result<ConversationList, ApiError> {
        self.pause().await;
        Ok(list(&[], None))
    }
}
