//! Sidebar projection.
//!
//! The sidebar is a pure function of `(conversations, active id)`; the TUI
//! never edits rows in place, it re-projects from the cache.

use std::collections::BTreeMap;

use crate::core::model::Conversation;

/// Text shown when the cache holds no conversations.
pub const EMPTY_SIDEBAR_TEXT: &str = "No conversations yet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub id: String,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarView {
    /// Single placeholder row instead of an empty list.
    Empty,
    Rows(Vec<SidebarRow>),
}

impl SidebarView {
    pub fn rows(&self) -> &[SidebarRow] {
        match self {
            SidebarView::Empty => &[],
            SidebarView::Rows(rows) => rows,
        }
    }
}

pub fn project(conversations: &BTreeMap<String, Conversation>, active: Option<&str>) -> SidebarView {
    if conversations.is_empty() {
        return SidebarView::Empty;
    }
    SidebarView::Rows(
        conversations
            .iter()
            .map(|(id, conversation)| SidebarRow {
                id: id.clone(),
                title: conversation.title.clone(),
                active: active == Some(id.as_str()),
            })
            .collect(),
    )
}
