pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;

pub use client::{ApiRequest, ChatApi, HttpChatApi, Reply, perform};
pub use endpoints::{ApiVariant, Endpoints, Route, Verb};
pub use error::ApiError;
pub use types::{ConversationList, CreateReply, SendReply};
