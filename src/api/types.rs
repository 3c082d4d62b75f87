//! Wire types for the conversation API.
//!
//! The two server generations answer with slightly different field names
//! (`response` vs `message`, `conversation` vs bare `title`). Each raw body
//! type accepts both and normalises into one reply type the reducer consumes.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;
use crate::core::model::Conversation;

/// Pull the `error` string out of a JSON body, if the server put one there.
pub fn error_field(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Send
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct SendBody {
    pub response: Option<String>,
    /// REST servers name the reply `message`.
    pub message: Option<String>,
    pub conversation: Option<Conversation>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendReply {
    /// Assistant reply text (markdown).
    pub reply: String,
    /// Title after this exchange, when the server reported one.
    pub title: Option<String>,
    /// Full authoritative conversation, when the server returned it.
    pub conversation: Option<Conversation>,
}

impl TryFrom<SendBody> for SendReply {
    type Error = ApiError;

    fn try_from(body: SendBody) -> Result<Self, Self::Error> {
        let reply = body
            .response
            .or(body.message)
            .ok_or_else(|| ApiError::Parse("reply text missing".to_string()))?;
        let title = body
            .conversation
            .as_ref()
            .map(|c| c.title.clone())
            .or(body.title);
        Ok(SendReply {
            reply,
            title,
            conversation: body.conversation,
        })
    }
}

// ============================================================================
// Create
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct CreateBody {
    pub conversation_id: String,
    pub conversation: Option<Conversation>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateReply {
    pub id: String,
    pub conversation: Conversation,
}

impl From<CreateBody> for CreateReply {
    fn from(body: CreateBody) -> Self {
        let conversation = match (body.conversation, body.title) {
            (Some(conversation), _) => conversation,
            (None, Some(title)) => Conversation::with_title(title),
            (None, None) => Conversation::empty(),
        };
        CreateReply {
            id: body.conversation_id,
            conversation,
        }
    }
}

// ============================================================================
// Clear / switch
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct ConversationBody {
    pub conversation: Option<Conversation>,
}

// ============================================================================
// List / delete
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct ListBody {
    pub conversations: Option<BTreeMap<String, Conversation>>,
    pub active_conversation: Option<String>,
}

/// Server's full view of the session: every conversation plus which one is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationList {
    pub conversations: BTreeMap<String, Conversation>,
    pub active: Option<String>,
}

impl ListBody {
    /// `None` when the body carried no `conversations` map at all.
    pub fn into_list(self) -> Option<ConversationList> {
        let conversations = self.conversations?;
        Some(ConversationList {
            conversations,
            active: self.active_conversation,
        })
    }
}
