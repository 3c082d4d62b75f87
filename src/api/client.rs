//! HTTP client for the conversation API.
//!
//! `ChatApi` is the seam between the client and the server: the TUI holds an
//! `Arc<dyn ChatApi>`, tests substitute their own implementation or point
//! `HttpChatApi` at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::endpoints::{ApiVariant, Endpoints, Route, Verb};
use super::error::ApiError;
use super::types::{
    ConversationBody, ConversationList, CreateBody, CreateReply, ListBody, SendBody, SendReply,
    error_field,
};
use crate::core::model::Conversation;
use crate::core::request::OpKind;

/// One request the reducer wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    SendMessage {
        conversation_id: Option<String>,
        message: String,
    },
    CreateConversation,
    ClearConversation {
        conversation_id: String,
    },
    FetchConversation {
        conversation_id: String,
    },
    ListConversations,
    DeleteConversation {
        conversation_id: String,
    },
}

impl ApiRequest {
    pub fn kind(&self) -> OpKind {
        match self {
            ApiRequest::SendMessage { .. } => OpKind::Send,
            ApiRequest::CreateConversation => OpKind::Create,
            ApiRequest::ClearConversation { .. } => OpKind::Clear,
            ApiRequest::FetchConversation { .. } => OpKind::Switch,
            ApiRequest::ListConversations => OpKind::List,
            ApiRequest::DeleteConversation { .. } => OpKind::Delete,
        }
    }
}

/// Normalised successful response, one variant per request kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Sent(SendReply),
    Created(CreateReply),
    Cleared(Conversation),
    Fetched(Conversation),
    Listed(ConversationList),
    Deleted(ConversationList),
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(
        &self,
        conversation_id: Option<&str>,
        message: &str,
    ) -> Result<SendReply, ApiError>;

    async fn create_conversation(&self) -> Result<CreateReply, ApiError>;

    /// Truncate a conversation's messages. Returns the emptied conversation.
    async fn clear_conversation(&self, id: &str) -> Result<Conversation, ApiError>;

    /// Fetch a conversation's authoritative title and messages.
    async fn fetch_conversation(&self, id: &str) -> Result<Conversation, ApiError>;

    async fn list_conversations(&self) -> Result<ConversationList, ApiError>;

    /// Delete a conversation. Returns the server's view of the session afterwards.
    async fn delete_conversation(&self, id: &str) -> Result<ConversationList, ApiError>;
}

/// Run `request` against `api`, bounded by `limit`.
///
/// A request that outlives `limit` resolves to `ApiError::Timeout` so the
/// caller always gets exactly one completion per request.
pub async fn perform(api: &dyn ChatApi, request: &ApiRequest, limit: Duration) -> Result<Reply, ApiError> {
    match tokio::time::timeout(limit, dispatch(api, request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{:?} request timed out after {:?}", request.kind(), limit);
            Err(ApiError::Timeout(limit))
        }
    }
}

async fn dispatch(api: &dyn ChatApi, request: &ApiRequest) -> Result<Reply, ApiError> {
    match request {
        ApiRequest::SendMessage {
            conversation_id,
            message,
        } => api
            .send_message(conversation_id.as_deref(), message)
            .await
            .map(Reply::Sent),
        ApiRequest::CreateConversation => api.create_conversation().await.map(Reply::Created),
        ApiRequest::ClearConversation { conversation_id } => api
            .clear_conversation(conversation_id)
            .await
            .map(Reply::Cleared),
        ApiRequest::FetchConversation { conversation_id } => api
            .fetch_conversation(conversation_id)
            .await
            .map(Reply::Fetched),
        ApiRequest::ListConversations => api.list_conversations().await.map(Reply::Listed),
        ApiRequest::DeleteConversation { conversation_id } => api
            .delete_conversation(conversation_id)
            .await
            .map(Reply::Deleted),
    }
}

// ============================================================================
// reqwest implementation
// ============================================================================

#[derive(Debug)]
pub struct HttpChatApi {
    base_url: Url,
    endpoints: Endpoints,
    client: reqwest::Client,
}

impl HttpChatApi {
    pub fn new(base_url: &str, variant: ApiVariant) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        info!("Chat API at {} ({:?} routes)", base_url, variant);
        Ok(Self {
            base_url,
            endpoints: Endpoints::new(variant),
            client: reqwest::Client::new(),
        })
    }

    /// Issue `route` and decode the JSON body, normalising every failure mode:
    /// transport errors, non-2xx statuses, and `error` fields in 2xx bodies.
    async fn call<T: DeserializeOwned>(&self, route: Route) -> Result<T, ApiError> {
        let url = route.url(&self.base_url)?;
        debug!("{:?} {}", route.verb, url);

        let builder = match route.verb {
            Verb::Get => self.client.get(url),
            Verb::Post => self.client.post(url),
            Verb::Delete => self.client.delete(url),
        };
        let builder = match &route.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(error_field)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            warn!("API error: {} - {}", status.as_u16(), message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = body.ok_or_else(|| ApiError::Parse("body is not JSON".to_string()))?;
        if let Some(message) = error_field(&body) {
            warn!("API reported error in {} body: {}", status.as_u16(), message);
            return Err(ApiError::Application(message));
        }
        serde_json::from_value(body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send_message(
        &self,
        conversation_id: Option<&str>,
        message: &str,
    ) -> Result<SendReply, ApiError> {
        let body: SendBody = self
            .call(self.endpoints.send_message(conversation_id, message))
            .await?;
        SendReply::try_from(body)
    }

    async fn create_conversation(&self) -> Result<CreateReply, ApiError> {
        let body: CreateBody = self.call(self.endpoints.create_conversation()).await?;
        Ok(body.into())
    }

    async fn clear_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        let body: ConversationBody = self.call(self.endpoints.clear_conversation(id)).await?;
        // Servers that only acknowledge the clear leave us the known end state.
        Ok(body.conversation.unwrap_or_default())
    }

    async fn fetch_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        let body: ConversationBody = self.call(self.endpoints.fetch_conversation(id)).await?;
        body.conversation
            .ok_or_else(|| ApiError::Parse("conversation missing".to_string()))
    }

    async fn list_conversations(&self) -> Result<ConversationList, ApiError> {
        let body: ListBody = self.call(self.endpoints.list_conversations()).await?;
        body.into_list()
            .ok_or_else(|| ApiError::Parse("conversations missing".to_string()))
    }

    async fn delete_conversation(&self, id: &str) -> Result<ConversationList, ApiError> {
        let body: ListBody = self.call(self.endpoints.delete_conversation(id)).await?;
        match body.into_list() {
            Some(list) => Ok(list),
            None => {
                // Acknowledgement only: ask for the post-delete session state.
                debug!("Delete reply carried no list, fetching it");
                self.list_conversations().await
            }
        }
    }
}
