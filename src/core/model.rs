//! # Conversation Model
//!
//! The client-side mirror of what the server stores. Nothing here is the
//! source of truth: entries are replaced wholesale whenever a fresher copy
//! arrives from the API.

use serde::{Deserialize, Serialize};

/// Title the server gives a conversation until it derives one from content.
pub const PLACEHOLDER_TITLE: &str = "New conversation";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A named, ordered sequence of messages. Insertion order is chronological.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Conversation {
    #[serde(default = "placeholder_title")]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

fn placeholder_title() -> String {
    PLACEHOLDER_TITLE.to_string()
}

impl Default for Conversation {
    fn default() -> Self {
        Self::empty()
    }
}

impl Conversation {
    /// A conversation with the placeholder title and no messages.
    pub fn empty() -> Self {
        Self {
            title: placeholder_title(),
            messages: Vec::new(),
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn has_placeholder_title(&self) -> bool {
        is_placeholder(&self.title)
    }
}

/// True when `title` is the server's "not yet named" sentinel (or blank).
pub fn is_placeholder(title: &str) -> bool {
    let trimmed = title.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER_TITLE
}
