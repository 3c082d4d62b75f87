//! # Endpoint Map
//!
//! Two server generations expose the same conversation operations under
//! different routes. Both are described here once; the rest of the client
//! only ever asks for "the route that sends a message".
//!
//! | operation | legacy | rest |
//! |---|---|---|
//! | send | `POST /api/send_message` | `POST /api/message` |
//! | create | `POST /api/create_conversation` | `POST /api/conversation/new` |
//! | clear | `POST /api/clear_conversation` | `POST /api/conversation/{id}/clear` |
//! | switch | `POST /api/switch_conversation` | `GET /api/conversation/{id}` |
//! | delete | `POST /api/delete_conversation` | `DELETE /api/conversation/{id}` |
//! | list | `GET /api/conversations` | `GET /api/conversations` |

use clap::ValueEnum;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ApiError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant {
    /// Action-named POST routes carrying `conversation_id` in the body.
    #[default]
    Legacy,
    /// Resource routes carrying the conversation id in the path.
    Rest,
}

impl ApiVariant {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Some(ApiVariant::Legacy),
            "rest" => Some(ApiVariant::Rest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Delete,
}

/// One concrete HTTP call: verb, path segments under the base URL, JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub verb: Verb,
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl Route {
    fn new(verb: Verb, segments: &[&str]) -> Self {
        Self {
            verb,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            body: None,
        }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path as it would appear on the wire (segments percent-encoded).
    pub fn path(&self) -> String {
        Url::parse("http://localhost/")
            .ok()
            .and_then(|base| self.url(&base).ok())
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }

    /// Resolve against `base`, keeping any path prefix the base already has.
    pub fn url(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("base URL cannot carry a path: {base}")))?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Endpoints {
    variant: ApiVariant,
}

impl Endpoints {
    pub fn new(variant: ApiVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> ApiVariant {
        self.variant
    }

    pub fn send_message(&self, conversation_id: Option<&str>, message: &str) -> Route {
        let body = json!({ "message": message, "conversation_id": conversation_id });
        match self.variant {
            ApiVariant::Legacy => Route::new(Verb::Post, &["api", "send_message"]),
            ApiVariant::Rest => Route::new(Verb::Post, &["api", "message"]),
        }
        .with_body(body)
    }

    pub fn create_conversation(&self) -> Route {
        match self.variant {
            ApiVariant::Legacy => Route::new(Verb::Post, &["api", "create_conversation"]),
            ApiVariant::Rest => Route::new(Verb::Post, &["api", "conversation", "new"]),
        }
    }

    pub fn clear_conversation(&self, id: &str) -> Route {
        match self.variant {
            ApiVariant::Legacy => Route::new(Verb::Post, &["api", "clear_conversation"])
                .with_body(json!({ "conversation_id": id })),
            ApiVariant::Rest => Route::new(Verb::Post, &["api", "conversation", id, "clear"]),
        }
    }

    /// Obtain a conversation's authoritative title and messages.
    /// The legacy server also records it as the session's active conversation.
    pub fn fetch_conversation(&self, id: &str) -> Route {
        match self.variant {
            ApiVariant::Legacy => Route::new(Verb::Post, &["api", "switch_conversation"])
                .with_body(json!({ "conversation_id": id })),
            ApiVariant::Rest => Route::new(Verb::Get, &["api", "conversation", id]),
        }
    }

    pub fn list_conversations(&self) -> Route {
        Route::new(Verb::Get, &["api", "conversations"])
    }

    pub fn delete_conversation(&self, id: &str) -> Route {
        match self.variant {
            ApiVariant::Legacy => Route::new(Verb::Post, &["api", "delete_conversation"])
                .with_body(json!({ "conversation_id": id })),
            ApiVariant::Rest => Route::new(Verb::Delete, &["api", "conversation", id]),
        }
    }
}
