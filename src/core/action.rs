//! # Actions
//!
//! Everything that can happen in the client becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The server answers? That's `Action::Completed { .. }`.
//!
//! `update()` applies an action to the state and returns the effects the
//! adapter must carry out (HTTP requests, clipboard writes). It does no I/O
//! itself, which keeps reconciliation testable without a network.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effects
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info, warn};

use crate::api::{ApiError, ApiRequest, ConversationList, CreateReply, Reply, SendReply};
use crate::core::model::{Conversation, Message, PLACEHOLDER_TITLE, Role, is_placeholder};
use crate::core::request::Ticket;
use crate::core::state::App;
use crate::core::toast::{Toast, ToastLevel};

#[derive(Debug)]
pub enum Action {
    /// Initial load: list conversations, then activate one (or create one).
    Bootstrap,
    Submit(String),
    CreateConversation,
    /// Clear the active conversation.
    ClearConversation,
    SwitchConversation(String),
    DeleteConversation(String),
    RefreshList,
    /// Copy the raw text of the thread message at this index.
    CopyMessage(usize),
    CopyFinished(Result<(), String>),
    ToggleSidebar,
    /// Terminal width changed.
    Resize(u16),
    Tick(Instant),
    Completed {
        ticket: Ticket,
        request: ApiRequest,
        result: Result<Reply, ApiError>,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Request(Ticket, ApiRequest),
    Copy(String),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Bootstrap => {
            app.bootstrapped = false;
            vec![issue(app, ApiRequest::ListConversations)]
        }
        Action::Submit(text) => {
            let text = text.trim();
            if text.is_empty() {
                return vec![];
            }
            // Optimistic: shown before the server confirms, never rolled back.
            let message = Message::user(text);
            if let Some(entry) = app
                .active_conversation_id
                .as_ref()
                .and_then(|id| app.conversations.get_mut(id))
            {
                entry.messages.push(message.clone());
            }
            append(app, message);
            vec![issue(
                app,
                ApiRequest::SendMessage {
                    conversation_id: app.active_conversation_id.clone(),
                    message: text.to_string(),
                },
            )]
        }
        Action::CreateConversation => vec![issue(app, ApiRequest::CreateConversation)],
        Action::ClearConversation => match app.active_conversation_id.clone() {
            Some(conversation_id) => {
                vec![issue(app, ApiRequest::ClearConversation { conversation_id })]
            }
            None => vec![],
        },
        Action::SwitchConversation(id) => {
            if app.active_conversation_id.as_deref() == Some(id.as_str()) {
                return vec![];
            }
            vec![issue(
                app,
                ApiRequest::FetchConversation {
                    conversation_id: id,
                },
            )]
        }
        Action::DeleteConversation(id) => vec![issue(
            app,
            ApiRequest::DeleteConversation {
                conversation_id: id,
            },
        )],
        Action::RefreshList => vec![issue(app, ApiRequest::ListConversations)],
        Action::CopyMessage(index) => match app.thread.get(index) {
            Some(message) if message.role == Role::Assistant => {
                vec![Effect::Copy(message.content.clone())]
            }
            _ => vec![],
        },
        Action::CopyFinished(Ok(())) => {
            notify(app, ToastLevel::Success, "Copied to clipboard");
            vec![]
        }
        Action::CopyFinished(Err(e)) => {
            warn!("Failed to copy: {}", e);
            notify(app, ToastLevel::Error, "Failed to copy to clipboard");
            vec![]
        }
        Action::ToggleSidebar => {
            app.sidebar_open = !app.sidebar_open;
            vec![]
        }
        Action::Resize(width) => {
            let narrow = width < app.settings.narrow_width;
            if narrow != app.narrow {
                app.sidebar_open = !narrow && app.settings.show_sidebar;
                app.narrow = narrow;
            }
            vec![]
        }
        Action::Tick(now) => {
            app.toasts.retain_mut(|toast| !toast.expired(now));
            vec![]
        }
        Action::Completed {
            ticket,
            request,
            result,
        } => {
            if !app.ledger.settle(ticket) {
                info!(
                    "Discarding stale {:?} response #{} ({} in flight)",
                    ticket.kind,
                    ticket.seq,
                    app.ledger.in_flight()
                );
                return vec![];
            }
            match result {
                Ok(reply) => reconcile(app, ticket, request, reply),
                Err(e) => {
                    warn!("{:?} failed: {}", ticket.kind, e);
                    let effects = bootstrap_fallback(app, &request);
                    notify(app, ToastLevel::Error, format!("{}: {}", failure_label(&request), e));
                    effects
                }
            }
        }
        Action::Quit => vec![Effect::Quit],
    }
}

fn issue(app: &mut App, request: ApiRequest) -> Effect {
    let ticket = app.ledger.issue(request.kind());
    debug!("Issuing {:?} #{}: {:?}", ticket.kind, ticket.seq, request);
    Effect::Request(ticket, request)
}

// ============================================================================
// Reconciliation
// ============================================================================

fn reconcile(app: &mut App, ticket: Ticket, request: ApiRequest, reply: Reply) -> Vec<Effect> {
    match (request, reply) {
        (ApiRequest::SendMessage { conversation_id, .. }, Reply::Sent(reply)) => {
            apply_sent(app, conversation_id, reply)
        }
        (ApiRequest::CreateConversation, Reply::Created(reply)) => {
            apply_created(app, ticket, reply)
        }
        (ApiRequest::ClearConversation { conversation_id }, Reply::Cleared(conversation)) => {
            apply_cleared(app, conversation_id, conversation)
        }
        (ApiRequest::FetchConversation { conversation_id }, Reply::Fetched(conversation)) => {
            apply_switched(app, ticket, conversation_id, conversation)
        }
        (ApiRequest::ListConversations, Reply::Listed(list)) => apply_listed(app, ticket, list),
        (ApiRequest::DeleteConversation { conversation_id }, Reply::Deleted(list)) => {
            apply_deleted(app, ticket, &conversation_id, list)
        }
        (request, reply) => {
            warn!("Reply {:?} does not answer {:?}, ignoring", reply, request);
            vec![]
        }
    }
}

fn apply_sent(app: &mut App, conversation_id: Option<String>, reply: SendReply) -> Vec<Effect> {
    // The user may have moved on while the reply was in flight; only the
    // conversation it was sent to is repainted.
    let still_active = app.active_conversation_id == conversation_id;
    let fresh_title = reply.title.filter(|t| !is_placeholder(t));

    if let Some(id) = conversation_id.as_ref() {
        match reply.conversation {
            Some(conversation) => {
                app.conversations.insert(id.clone(), conversation);
            }
            None => {
                // The user message went into the entry at submit time.
                if let Some(entry) = app.conversations.get_mut(id) {
                    entry.messages.push(Message::assistant(reply.reply.clone()));
                    if let Some(title) = fresh_title.as_ref() {
                        entry.title = title.clone();
                    }
                }
            }
        }
    }

    if !still_active {
        info!("Reply for {:?} arrived after switching away", conversation_id);
    } else if app.active_conversation().is_some() {
        paint_active(app);
    } else {
        // Sent before any conversation existed: nothing cached to mirror.
        append(app, Message::assistant(reply.reply));
        if let Some(title) = fresh_title {
            app.header_title = title;
        }
    }

    vec![issue(app, ApiRequest::ListConversations)]
}

fn apply_created(app: &mut App, ticket: Ticket, reply: CreateReply) -> Vec<Effect> {
    info!("Created conversation {}", reply.id);
    app.conversations.insert(reply.id.clone(), reply.conversation);
    if app.ledger.may_activate(ticket) {
        app.ledger.claim_active(ticket);
        app.active_conversation_id = Some(reply.id);
        paint_active(app);
    } else {
        info!("Not activating {}: a newer request already moved the view", reply.id);
    }
    vec![issue(app, ApiRequest::ListConversations)]
}

fn apply_cleared(app: &mut App, conversation_id: String, conversation: Conversation) -> Vec<Effect> {
    let is_active = app.active_conversation_id.as_deref() == Some(conversation_id.as_str());
    app.conversations.insert(conversation_id, conversation);
    if is_active {
        app.thread.clear();
        app.header_title = PLACEHOLDER_TITLE.to_string();
        app.scroll_to_end = true;
    }
    vec![issue(app, ApiRequest::ListConversations)]
}

fn apply_switched(
    app: &mut App,
    ticket: Ticket,
    conversation_id: String,
    conversation: Conversation,
) -> Vec<Effect> {
    app.conversations.insert(conversation_id.clone(), conversation);
    if !app.ledger.may_activate(ticket) {
        info!("Not switching to {}: a newer request already moved the view", conversation_id);
        return vec![];
    }
    info!(
        "Switched to {} ({} messages)",
        conversation_id,
        app.conversations
            .get(&conversation_id)
            .map_or(0, |c| c.messages.len())
    );
    app.ledger.claim_active(ticket);
    app.active_conversation_id = Some(conversation_id);
    paint_active(app);
    if app.narrow {
        app.sidebar_open = false;
    }
    vec![]
}

fn apply_listed(app: &mut App, ticket: Ticket, list: ConversationList) -> Vec<Effect> {
    let ConversationList {
        conversations,
        active,
    } = list;
    let previous = app.active_conversation_id.clone();
    let pinned = !app.ledger.may_activate(ticket);
    replace_cache(app, conversations, pinned);

    // The client's own choice wins while it still exists; the server's
    // designation fills in when we have none (first load, deleted elsewhere).
    let next = if pinned {
        previous.clone()
    } else {
        previous
            .clone()
            .filter(|id| app.conversations.contains_key(id))
            .or_else(|| active.filter(|id| app.conversations.contains_key(id)))
            .or_else(|| app.conversations.keys().next().cloned())
    };
    app.active_conversation_id = next;
    if app.active_conversation_id != previous {
        app.ledger.claim_active(ticket);
        paint_active(app);
    }

    let first_load = !app.bootstrapped;
    app.bootstrapped = true;
    if first_load && app.conversations.is_empty() {
        info!("No conversations on first load, creating one");
        return vec![issue(app, ApiRequest::CreateConversation)];
    }
    vec![]
}

fn apply_deleted(
    app: &mut App,
    ticket: Ticket,
    conversation_id: &str,
    list: ConversationList,
) -> Vec<Effect> {
    info!("Deleted conversation {}", conversation_id);
    let ConversationList {
        conversations,
        active,
    } = list;
    let previous = app.active_conversation_id.clone();
    let deleted_was_active = previous.as_deref() == Some(conversation_id);
    replace_cache(app, conversations, !deleted_was_active && !app.ledger.may_activate(ticket));

    // Only an emptied server leaves nothing active.
    let next = previous
        .clone()
        .filter(|id| !deleted_was_active && app.conversations.contains_key(id))
        .or_else(|| active.filter(|id| app.conversations.contains_key(id)))
        .or_else(|| app.conversations.keys().next().cloned());
    app.active_conversation_id = next;

    if deleted_was_active || app.active_conversation_id != previous {
        app.ledger.claim_active(ticket);
        paint_active(app);
    }
    vec![]
}

/// Swap in a server snapshot of every conversation. With `pin_active` the
/// snapshot predates the request that activated the current conversation,
/// so that entry is carried over when the snapshot lacks it.
fn replace_cache(app: &mut App, conversations: BTreeMap<String, Conversation>, pin_active: bool) {
    let pinned = if pin_active {
        app.active_conversation_id
            .clone()
            .and_then(|id| app.conversations.remove(&id).map(|c| (id, c)))
    } else {
        None
    };
    app.conversations = conversations;
    if let Some((id, conversation)) = pinned {
        app.conversations.entry(id).or_insert(conversation);
    }
}

/// A first list that fails still leaves the user somewhere to type.
fn bootstrap_fallback(app: &mut App, request: &ApiRequest) -> Vec<Effect> {
    if matches!(request, ApiRequest::ListConversations) && !app.bootstrapped {
        app.bootstrapped = true;
        if app.active_conversation_id.is_none() {
            return vec![issue(app, ApiRequest::CreateConversation)];
        }
    }
    vec![]
}

// ============================================================================
// Helpers
// ============================================================================

/// Replace the thread and header with the active conversation's cached copy.
fn paint_active(app: &mut App) {
    let active = app
        .active_conversation_id
        .as_ref()
        .and_then(|id| app.conversations.get(id));
    match active {
        Some(conversation) => {
            app.header_title = conversation.title.clone();
            app.thread = conversation.messages.clone();
        }
        None => {
            app.header_title = PLACEHOLDER_TITLE.to_string();
            app.thread.clear();
        }
    }
    app.scroll_to_end = true;
}

fn append(app: &mut App, message: Message) {
    app.thread.push(message);
    app.scroll_to_end = true;
}

fn notify(app: &mut App, level: ToastLevel, text: impl Into<String>) {
    let ttl = match level {
        ToastLevel::Success => app.settings.toast_ttl,
        ToastLevel::Error => app.settings.error_toast_ttl,
    };
    app.toasts.push(Toast::new(level, text, ttl));
}

fn failure_label(request: &ApiRequest) -> &'static str {
    match request {
        ApiRequest::SendMessage { .. } => "Failed to send message",
        ApiRequest::CreateConversation => "Failed to create new conversation",
        ApiRequest::ClearConversation { .. } => "Failed to clear conversation",
        ApiRequest::FetchConversation { .. } => "Failed to load conversation",
        ApiRequest::ListConversations => "Failed to refresh conversations",
        ApiRequest::DeleteConversation { .. } => "Failed to delete conversation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::OpKind;
    use crate::test_support::{app_with, conversation, list, test_app};
    use std::time::Duration;

    /// Pull the single request out of an effect list.
    fn only_request(effects: Vec<Effect>) -> (Ticket, ApiRequest) {
        assert_eq!(effects.len(), 1, "expected one effect, got {:?}", effects);
        match effects.into_iter().next() {
            Some(Effect::Request(ticket, request)) => (ticket, request),
            other => panic!("expected Request effect, got {:?}", other),
        }
    }

    fn complete(app: &mut App, ticket: Ticket, request: ApiRequest, result: Result<Reply, ApiError>) -> Vec<Effect> {
        update(app, Action::Completed { ticket, request, result })
    }

    fn requests(effects: &[Effect]) -> Vec<&ApiRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Request(_, r) => Some(r),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // sendMessage
    // ------------------------------------------------------------------

    #[test]
    fn test_submit_blank_is_noop() {
        let mut app = app_with(&[("c1", conversation("Chat", &[]))], Some("c1"));
        for text in ["", "   ", "\n\t "] {
            let effects = update(&mut app, Action::Submit(text.to_string()));
            assert!(effects.is_empty());
        }
        assert!(app.thread.is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_send_hello_scenario() {
        let mut app = app_with(&[("c1", conversation("New conversation", &[]))], Some("c1"));

        let (ticket, request) = only_request(update(&mut app, Action::Submit("Hello".into())));
        assert_eq!(
            request,
            ApiRequest::SendMessage {
                conversation_id: Some("c1".into()),
                message: "Hello".into(),
            }
        );
        assert_eq!(app.thread, vec![Message::user("Hello")]);
        assert!(app.is_loading(), "loading indicator shown while in flight");

        let reply = SendReply {
            reply: "Hi there".into(),
            title: None,
            conversation: None,
        };
        let effects = complete(&mut app, ticket, request, Ok(Reply::Sent(reply)));

        assert_eq!(
            app.thread,
            vec![Message::user("Hello"), Message::assistant("Hi there")]
        );
        // The follow-up list refresh is a new request; the send itself settled.
        assert_eq!(requests(&effects), vec![&ApiRequest::ListConversations]);
        assert_eq!(app.ledger.in_flight(), 1);
    }

    #[test]
    fn test_submit_trims_text() {
        let mut app = app_with(&[("c1", conversation("Chat", &[]))], Some("c1"));
        let (_, request) = only_request(update(&mut app, Action::Submit("  hi \n".into())));
        assert!(matches!(request, ApiRequest::SendMessage { ref message, .. } if message == "hi"));
        assert_eq!(app.thread, vec![Message::user("hi")]);
    }

    #[test]
    fn test_send_updates_title_in_header_and_sidebar() {
        let mut app = app_with(&[("c1", conversation("New conversation", &[]))], Some("c1"));
        let (ticket, request) = only_request(update(&mut app, Action::Submit("What is Rust?".into())));
        let reply = SendReply {
            reply: "A language".into(),
            title: Some("What is Rust?".into()),
            conversation: None,
        };
        complete(&mut app, ticket, request, Ok(Reply::Sent(reply)));

        assert_eq!(app.header_title, "What is Rust?");
        assert_eq!(app.sidebar().rows()[0].title, "What is Rust?");
    }

    #[test]
    fn test_send_placeholder_title_leaves_header() {
        let mut app = app_with(&[("c1", conversation("Custom", &[]))], Some("c1"));
        app.header_title = "Custom".into();
        let (ticket, request) = only_request(update(&mut app, Action::Submit("x".into())));
        let reply = SendReply {
            reply: "y".into(),
            title: Some(PLACEHOLDER_TITLE.into()),
            conversation: None,
        };
        complete(&mut app, ticket, request, Ok(Reply::Sent(reply)));
        assert_eq!(app.header_title, "Custom");
    }

    #[test]
    fn test_send_replaces_cache_entry_with_server_copy() {
        let mut app = app_with(&[("c1", conversation("Old", &[]))], Some("c1"));
        let (ticket, request) = only_request(update(&mut app, Action::Submit("Hello".into())));
        let server_copy = conversation("Hello", &[Message::user("Hello"), Message::assistant("Hi")]);
        let reply = SendReply {
            reply: "Hi".into(),
            title: Some("Hello".into()),
            conversation: Some(server_copy.clone()),
        };
        complete(&mut app, ticket, request, Ok(Reply::Sent(reply)));
        assert_eq!(app.conversations["c1"], server_copy);
        assert_eq!(app.thread, server_copy.messages);
    }

    #[test]
    fn test_send_failure_keeps_optimistic_message_and_toasts() {
        let mut app = app_with(&[("c1", conversation("Chat", &[]))], Some("c1"));
        let (ticket, request) = only_request(update(&mut app, Action::Submit("Hello".into())));
        let effects = complete(
            &mut app,
            ticket,
            request,
            Err(ApiError::Application("Invalid conversation ID".into())),
        );
        assert!(effects.is_empty());
        assert_eq!(app.thread, vec![Message::user("Hello")]);
        assert!(!app.is_loading());
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].level, ToastLevel::Error);
        assert!(app.toasts[0].text.contains("Invalid conversation ID"));
    }

    #[test]
    fn test_send_timeout_clears_loading() {
        let mut app = app_with(&[("c1", conversation("Chat", &[]))], Some("c1"));
        let (ticket, request) = only_request(update(&mut app, Action::Submit("Hello".into())));
        complete(&mut app, ticket, request, Err(ApiError::Timeout(Duration::from_secs(30))));
        assert!(!app.is_loading());
        assert!(app.toasts[0].text.contains("timed out"));
    }

    #[test]
    fn test_reply_for_abandoned_conversation_not_painted() {
        let mut app = app_with(
            &[("c1", conversation("One", &[])), ("c2", conversation("Two", &[]))],
            Some("c1"),
        );
        let (send_ticket, send_request) = only_request(update(&mut app, Action::Submit("Hello".into())));

        // Switch to c2 before the reply lands
        let (sw_ticket, sw_request) =
            only_request(update(&mut app, Action::SwitchConversation("c2".into())));
        complete(
            &mut app,
            sw_ticket,
            sw_request,
            Ok(Reply::Fetched(conversation("Two", &[Message::user("earlier")]))),
        );
        assert_eq!(app.thread, vec![Message::user("earlier")]);

        let reply = SendReply {
            reply: "Hi".into(),
            title: None,
            conversation: Some(conversation("One", &[Message::user("Hello"), Message::assistant("Hi")])),
        };
        complete(&mut app, send_ticket, send_request, Ok(Reply::Sent(reply)));

        assert_eq!(app.thread, vec![Message::user("earlier")]);
        assert_eq!(app.conversations["c1"].messages.len(), 2);
    }

    #[test]
    fn test_overlapping_sends_repaint_from_server_copy() {
        let mut app = app_with(&[("c1", conversation("Chat", &[]))], Some("c1"));
        let (t1, r1) = only_request(update(&mut app, Action::Submit("q1".into())));
        let (t2, r2) = only_request(update(&mut app, Action::Submit("q2".into())));

        let first = SendReply {
            reply: "a1".into(),
            title: None,
            conversation: Some(conversation("Chat", &[Message::user("q1"), Message::assistant("a1")])),
        };
        complete(&mut app, t1, r1, Ok(Reply::Sent(first)));

        let full = [
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
        ];
        let second = SendReply {
            reply: "a2".into(),
            title: None,
            conversation: Some(conversation("Chat", &full)),
        };
        complete(&mut app, t2, r2, Ok(Reply::Sent(second)));

        assert_eq!(app.thread, full.to_vec());
        assert_eq!(app.thread, app.conversations["c1"].messages);
        // Only the follow-up list refresh is left
        assert_eq!(app.ledger.in_flight(), 1);
    }

    #[test]
    fn test_send_without_server_copy_keeps_cache_and_thread_in_step() {
        let mut app = app_with(&[("c1", conversation("Chat", &[]))], Some("c1"));
        let (_t1, _r1) = only_request(update(&mut app, Action::Submit("q1".into())));
        let (t2, r2) = only_request(update(&mut app, Action::Submit("q2".into())));
        assert_eq!(app.thread, app.conversations["c1"].messages);

        let reply = SendReply {
            reply: "a2".into(),
            title: Some("q1".into()),
            conversation: None,
        };
        complete(&mut app, t2, r2, Ok(Reply::Sent(reply)));

        assert_eq!(
            app.conversations["c1"].messages,
            vec![Message::user("q1"), Message::user("q2"), Message::assistant("a2")]
        );
        assert_eq!(app.thread, app.conversations["c1"].messages);
        assert_eq!(app.header_title, "q1");
    }

    // ------------------------------------------------------------------
    // createConversation
    // ------------------------------------------------------------------

    #[test]
    fn test_create_activates_and_clears_thread() {
        let mut app = app_with(
            &[("c1", conversation("One", &[Message::user("hi")]))],
            Some("c1"),
        );
        app.thread = vec![Message::user("hi")];
        app.header_title = "One".into();

        let (ticket, request) = only_request(update(&mut app, Action::CreateConversation));
        let effects = complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Created(CreateReply {
                id: "c2".into(),
                conversation: Conversation::empty(),
            })),
        );

        assert_eq!(app.active_conversation_id.as_deref(), Some("c2"));
        assert!(app.thread.is_empty());
        assert_eq!(app.header_title, PLACEHOLDER_TITLE);
        assert!(app.conversations.contains_key("c2"));
        assert_eq!(requests(&effects), vec![&ApiRequest::ListConversations]);
    }

    #[test]
    fn test_older_create_does_not_override_newer_switch() {
        let mut app = app_with(
            &[("c1", conversation("One", &[])), ("c2", conversation("Two", &[]))],
            Some("c1"),
        );
        let (create_ticket, create_request) =
            only_request(update(&mut app, Action::CreateConversation));
        let (sw_ticket, sw_request) =
            only_request(update(&mut app, Action::SwitchConversation("c2".into())));

        complete(
            &mut app,
            sw_ticket,
            sw_request,
            Ok(Reply::Fetched(conversation("Two", &[Message::user("2")]))),
        );
        let effects = complete(
            &mut app,
            create_ticket,
            create_request,
            Ok(Reply::Created(CreateReply {
                id: "new".into(),
                conversation: Conversation::empty(),
            })),
        );

        assert_eq!(app.active_conversation_id.as_deref(), Some("c2"));
        assert_eq!(app.thread, vec![Message::user("2")]);
        // Still cached, so it shows up in the sidebar
        assert!(app.conversations.contains_key("new"));
        assert_eq!(requests(&effects), vec![&ApiRequest::ListConversations]);
    }

    #[test]
    fn test_create_failure_changes_nothing() {
        let mut app = app_with(&[("c1", conversation("One", &[]))], Some("c1"));
        let (ticket, request) = only_request(update(&mut app, Action::CreateConversation));
        complete(&mut app, ticket, request, Err(ApiError::Network("refused".into())));
        assert_eq!(app.active_conversation_id.as_deref(), Some("c1"));
        assert_eq!(app.conversations.len(), 1);
        assert_eq!(app.toasts.len(), 1);
    }

    #[test]
    fn test_create_then_switch_same_id_is_noop() {
        let mut app = test_app();
        let (ticket, request) = only_request(update(&mut app, Action::CreateConversation));
        complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Created(CreateReply {
                id: "fresh".into(),
                conversation: Conversation::empty(),
            })),
        );
        let before = app.ledger.in_flight();
        let effects = update(&mut app, Action::SwitchConversation("fresh".into()));
        assert!(effects.is_empty());
        assert_eq!(app.ledger.in_flight(), before);
    }

    // ------------------------------------------------------------------
    // clearConversation
    // ------------------------------------------------------------------

    #[test]
    fn test_clear_without_active_is_noop() {
        let mut app = test_app();
        assert!(update(&mut app, Action::ClearConversation).is_empty());
    }

    #[test]
    fn test_clear_empties_thread_and_resets_header() {
        let msgs = [Message::user("a"), Message::assistant("b")];
        let mut app = app_with(&[("c1", conversation("Topic", &msgs))], Some("c1"));
        app.thread = msgs.to_vec();
        app.header_title = "Topic".into();

        let (ticket, request) = only_request(update(&mut app, Action::ClearConversation));
        assert_eq!(
            request,
            ApiRequest::ClearConversation {
                conversation_id: "c1".into()
            }
        );
        let effects = complete(&mut app, ticket, request, Ok(Reply::Cleared(Conversation::empty())));

        assert!(app.thread.is_empty());
        assert_eq!(app.header_title, PLACEHOLDER_TITLE);
        assert!(app.conversations["c1"].messages.is_empty());
        assert_eq!(requests(&effects), vec![&ApiRequest::ListConversations]);
    }

    // ------------------------------------------------------------------
    // switchConversation
    // ------------------------------------------------------------------

    #[test]
    fn test_switch_to_active_is_noop() {
        let mut app = app_with(&[("c1", conversation("One", &[]))], Some("c1"));
        app.thread = vec![Message::user("keep")];
        let effects = update(&mut app, Action::SwitchConversation("c1".into()));
        assert!(effects.is_empty());
        assert!(!app.is_loading());
        assert_eq!(app.thread, vec![Message::user("keep")]);
    }

    #[test]
    fn test_switch_paints_messages_in_order_and_marks_active() {
        let mut app = app_with(
            &[("c1", conversation("One", &[])), ("c2", conversation("Two", &[]))],
            Some("c1"),
        );
        let (ticket, request) = only_request(update(&mut app, Action::SwitchConversation("c2".into())));
        let msgs = [Message::user("q1"), Message::assistant("a1"), Message::user("q2")];
        complete(&mut app, ticket, request, Ok(Reply::Fetched(conversation("Two", &msgs))));

        assert_eq!(app.active_conversation_id.as_deref(), Some("c2"));
        assert_eq!(app.thread, msgs.to_vec());
        assert_eq!(app.header_title, "Two");
        let active: Vec<_> = app.sidebar().rows().iter().filter(|r| r.active).map(|r| r.id.clone()).collect();
        assert_eq!(active, vec!["c2"]);
    }

    #[test]
    fn test_switch_collapses_sidebar_when_narrow() {
        let mut app = app_with(
            &[("c1", conversation("One", &[])), ("c2", conversation("Two", &[]))],
            Some("c1"),
        );
        update(&mut app, Action::Resize(40));
        app.sidebar_open = true;
        let (ticket, request) = only_request(update(&mut app, Action::SwitchConversation("c2".into())));
        complete(&mut app, ticket, request, Ok(Reply::Fetched(conversation("Two", &[]))));
        assert!(!app.sidebar_open);
    }

    #[test]
    fn test_stale_switch_response_is_discarded() {
        let mut app = app_with(
            &[
                ("c1", conversation("One", &[])),
                ("c2", conversation("Two", &[])),
                ("c3", conversation("Three", &[])),
            ],
            Some("c1"),
        );
        let (t2, r2) = only_request(update(&mut app, Action::SwitchConversation("c2".into())));
        let (t3, r3) = only_request(update(&mut app, Action::SwitchConversation("c3".into())));

        // Newer lands first, older straggles in afterwards
        complete(&mut app, t3, r3, Ok(Reply::Fetched(conversation("Three", &[Message::user("3")]))));
        complete(&mut app, t2, r2, Ok(Reply::Fetched(conversation("Two", &[Message::user("2")]))));

        assert_eq!(app.active_conversation_id.as_deref(), Some("c3"));
        assert_eq!(app.thread, vec![Message::user("3")]);
        assert!(!app.is_loading());
    }

    #[test]
    fn test_stale_failure_is_silent() {
        let mut app = app_with(&[("c1", conversation("One", &[]))], Some("c1"));
        let (t_old, r_old) = only_request(update(&mut app, Action::SwitchConversation("c2".into())));
        let _newer = update(&mut app, Action::SwitchConversation("c3".into()));
        complete(&mut app, t_old, r_old, Err(ApiError::Network("reset".into())));
        assert!(app.toasts.is_empty());
    }

    // ------------------------------------------------------------------
    // deleteConversation
    // ------------------------------------------------------------------

    #[test]
    fn test_delete_active_repaints_server_designated() {
        let mut app = app_with(
            &[
                ("c1", conversation("One", &[Message::user("stale")])),
                ("c2", conversation("Two", &[])),
            ],
            Some("c1"),
        );
        app.thread = vec![Message::user("stale")];

        let (ticket, request) = only_request(update(&mut app, Action::DeleteConversation("c1".into())));
        let designated = conversation("Two", &[Message::user("q"), Message::assistant("a")]);
        let effects = complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Deleted(list(&[("c2", designated.clone())], Some("c2")))),
        );

        assert!(effects.is_empty());
        assert_eq!(app.active_conversation_id.as_deref(), Some("c2"));
        assert_eq!(app.thread, designated.messages);
        assert_eq!(app.header_title, "Two");
        assert!(!app.conversations.contains_key("c1"));
    }

    #[test]
    fn test_delete_only_conversation_scenario() {
        let mut app = app_with(&[("c1", conversation("One", &[Message::user("x")]))], Some("c1"));
        app.thread = vec![Message::user("x")];
        app.header_title = "One".into();

        let (ticket, request) = only_request(update(&mut app, Action::DeleteConversation("c1".into())));
        complete(&mut app, ticket, request, Ok(Reply::Deleted(list(&[], None))));

        assert_eq!(app.sidebar(), crate::core::sidebar::SidebarView::Empty);
        assert!(app.thread.is_empty());
        assert_eq!(app.header_title, PLACEHOLDER_TITLE);
        assert!(app.active_conversation_id.is_none());
    }

    #[test]
    fn test_delete_inactive_keeps_thread() {
        let mut app = app_with(
            &[("c1", conversation("One", &[Message::user("keep")])), ("c2", conversation("Two", &[]))],
            Some("c1"),
        );
        app.thread = vec![Message::user("keep")];
        let (ticket, request) = only_request(update(&mut app, Action::DeleteConversation("c2".into())));
        complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Deleted(list(&[("c1", conversation("One", &[Message::user("keep")]))], Some("c1")))),
        );
        assert_eq!(app.thread, vec![Message::user("keep")]);
        assert_eq!(app.sidebar().rows().len(), 1);
    }

    #[test]
    fn test_delete_designating_missing_id_falls_back_to_first_remaining() {
        let two = conversation("Two", &[Message::user("q")]);
        for designated in [Some("ghost"), None] {
            let mut app = app_with(&[("c1", conversation("One", &[]))], Some("c1"));
            let (ticket, request) =
                only_request(update(&mut app, Action::DeleteConversation("c1".into())));
            complete(
                &mut app,
                ticket,
                request,
                Ok(Reply::Deleted(list(&[("c2", two.clone())], designated))),
            );
            assert_eq!(app.active_conversation_id.as_deref(), Some("c2"));
            assert_eq!(app.thread, two.messages);
            assert_eq!(app.header_title, "Two");
        }
    }

    #[test]
    fn test_older_switch_does_not_override_newer_delete() {
        let mut app = app_with(
            &[
                ("c1", conversation("One", &[])),
                ("c2", conversation("Two", &[])),
                ("c3", conversation("Three", &[])),
            ],
            Some("c1"),
        );
        let (sw_ticket, sw_request) =
            only_request(update(&mut app, Action::SwitchConversation("c2".into())));
        let (del_ticket, del_request) =
            only_request(update(&mut app, Action::DeleteConversation("c1".into())));

        complete(
            &mut app,
            del_ticket,
            del_request,
            Ok(Reply::Deleted(list(
                &[("c2", conversation("Two", &[])), ("c3", conversation("Three", &[]))],
                Some("c3"),
            ))),
        );
        assert_eq!(app.active_conversation_id.as_deref(), Some("c3"));

        let fetched = conversation("Two", &[Message::user("late")]);
        complete(&mut app, sw_ticket, sw_request, Ok(Reply::Fetched(fetched.clone())));
        assert_eq!(app.active_conversation_id.as_deref(), Some("c3"));
        assert_eq!(app.header_title, "Three");
        assert_eq!(app.conversations["c2"], fetched);
        assert!(!app.is_loading());
    }

    #[test]
    fn test_older_delete_keeps_newer_switch() {
        let mut app = app_with(
            &[
                ("c1", conversation("One", &[])),
                ("c2", conversation("Two", &[])),
                ("c3", conversation("Three", &[])),
            ],
            Some("c1"),
        );
        let (del_ticket, del_request) =
            only_request(update(&mut app, Action::DeleteConversation("c3".into())));
        let (sw_ticket, sw_request) =
            only_request(update(&mut app, Action::SwitchConversation("c2".into())));

        let two = conversation("Two", &[Message::user("hi")]);
        complete(&mut app, sw_ticket, sw_request, Ok(Reply::Fetched(two.clone())));
        complete(
            &mut app,
            del_ticket,
            del_request,
            Ok(Reply::Deleted(list(
                &[("c1", conversation("One", &[])), ("c2", two.clone())],
                Some("c1"),
            ))),
        );

        assert_eq!(app.active_conversation_id.as_deref(), Some("c2"));
        assert_eq!(app.thread, two.messages);
        assert!(!app.conversations.contains_key("c3"));
    }

    // ------------------------------------------------------------------
    // list / bootstrap
    // ------------------------------------------------------------------

    #[test]
    fn test_bootstrap_with_existing_conversations() {
        let mut app = test_app();
        let (ticket, request) = only_request(update(&mut app, Action::Bootstrap));
        let msgs = [Message::user("hi"), Message::assistant("hello")];
        let effects = complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Listed(list(
                &[("a", conversation("A", &[])), ("b", conversation("B", &msgs))],
                Some("b"),
            ))),
        );
        assert!(effects.is_empty());
        assert!(app.bootstrapped);
        assert_eq!(app.active_conversation_id.as_deref(), Some("b"));
        assert_eq!(app.thread, msgs.to_vec());
        assert_eq!(app.header_title, "B");
    }

    #[test]
    fn test_bootstrap_empty_creates_conversation() {
        let mut app = test_app();
        let (ticket, request) = only_request(update(&mut app, Action::Bootstrap));
        let effects = complete(&mut app, ticket, request, Ok(Reply::Listed(list(&[], None))));
        assert_eq!(requests(&effects), vec![&ApiRequest::CreateConversation]);
    }

    #[test]
    fn test_bootstrap_list_failure_falls_back_to_create() {
        let mut app = test_app();
        let (ticket, request) = only_request(update(&mut app, Action::Bootstrap));
        let effects = complete(
            &mut app,
            ticket,
            request,
            Err(ApiError::Http { status: 404, message: "Not Found".into() }),
        );
        assert_eq!(requests(&effects), vec![&ApiRequest::CreateConversation]);
        assert_eq!(app.toasts.len(), 1);
    }

    #[test]
    fn test_refresh_keeps_client_active_and_replaces_entries() {
        let mut app = app_with(
            &[("a", conversation("A", &[])), ("b", conversation("B", &[]))],
            Some("a"),
        );
        app.bootstrapped = true;
        app.thread = vec![Message::user("optimistic")];
        let (ticket, request) = only_request(update(&mut app, Action::RefreshList));
        complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Listed(list(
                &[("a", conversation("Renamed", &[])), ("b", conversation("B", &[]))],
                Some("b"),
            ))),
        );
        assert_eq!(app.active_conversation_id.as_deref(), Some("a"));
        assert_eq!(app.conversations["a"].title, "Renamed");
        // Thread untouched when the active conversation did not change
        assert_eq!(app.thread, vec![Message::user("optimistic")]);
    }

    #[test]
    fn test_refresh_adopts_server_active_when_ours_vanished() {
        let mut app = app_with(&[("a", conversation("A", &[]))], Some("a"));
        app.bootstrapped = true;
        let (ticket, request) = only_request(update(&mut app, Action::RefreshList));
        complete(
            &mut app,
            ticket,
            request,
            Ok(Reply::Listed(list(&[("b", conversation("B", &[Message::user("x")]))], Some("b")))),
        );
        assert_eq!(app.active_conversation_id.as_deref(), Some("b"));
        assert_eq!(app.thread, vec![Message::user("x")]);
    }

    #[test]
    fn test_active_is_always_a_cache_key_after_reconcile() {
        let mut app = app_with(&[("a", conversation("A", &[]))], Some("a"));
        app.bootstrapped = true;
        let (ticket, request) = only_request(update(&mut app, Action::RefreshList));
        complete(&mut app, ticket, request, Ok(Reply::Listed(list(&[], Some("a")))));
        assert!(app.active_conversation_id.is_none());
    }

    #[test]
    fn test_stale_list_keeps_newer_created_conversation() {
        let mut app = app_with(&[("c1", conversation("One", &[]))], Some("c1"));
        let (list_ticket, list_request) = only_request(update(&mut app, Action::RefreshList));
        let (create_ticket, create_request) =
            only_request(update(&mut app, Action::CreateConversation));
        complete(
            &mut app,
            create_ticket,
            create_request,
            Ok(Reply::Created(CreateReply {
                id: "new".into(),
                conversation: Conversation::empty(),
            })),
        );

        // Snapshot taken before the create reached the server
        complete(
            &mut app,
            list_ticket,
            list_request,
            Ok(Reply::Listed(list(&[("c1", conversation("One", &[]))], Some("c1")))),
        );

        assert_eq!(app.active_conversation_id.as_deref(), Some("new"));
        assert!(app.conversations.contains_key("new"));
        assert!(app.thread.is_empty());
    }

    #[test]
    fn test_mismatched_reply_ignored() {
        let mut app = test_app();
        let (ticket, _) = only_request(update(&mut app, Action::RefreshList));
        let effects = complete(
            &mut app,
            ticket,
            ApiRequest::ListConversations,
            Ok(Reply::Cleared(Conversation::empty())),
        );
        assert!(effects.is_empty());
        assert_eq!(ticket.kind, OpKind::List);
    }

    // ------------------------------------------------------------------
    // copy / toasts / sidebar
    // ------------------------------------------------------------------

    #[test]
    fn test_copy_assistant_message_uses_raw_markdown() {
        let mut app = test_app();
        app.thread = vec![Message::user("q"), Message::assistant("**bold** `code`")];
        assert!(update(&mut app, Action::CopyMessage(0)).is_empty());
        assert_eq!(
            update(&mut app, Action::CopyMessage(1)),
            vec![Effect::Copy("**bold** `code`".into())]
        );
        assert!(update(&mut app, Action::CopyMessage(9)).is_empty());
    }

    #[test]
    fn test_copy_success_toast_expires() {
        let mut app = test_app();
        update(&mut app, Action::CopyFinished(Ok(())));
        assert_eq!(app.toasts[0].level, ToastLevel::Success);

        let start = Instant::now();
        update(&mut app, Action::Tick(start));
        assert_eq!(app.toasts.len(), 1);
        let ttl = app.settings.toast_ttl;
        update(&mut app, Action::Tick(start + ttl));
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn test_copy_failure_raises_error_toast() {
        let mut app = test_app();
        update(&mut app, Action::CopyFinished(Err("no display".into())));
        assert_eq!(app.toasts[0].level, ToastLevel::Error);
        assert_eq!(app.toasts[0].text, "Failed to copy to clipboard");
    }

    #[test]
    fn test_resize_collapses_and_restores_sidebar() {
        let mut app = test_app();
        update(&mut app, Action::Resize(60));
        assert!(app.narrow);
        assert!(!app.sidebar_open);
        update(&mut app, Action::ToggleSidebar);
        assert!(app.sidebar_open);
        update(&mut app, Action::Resize(61));
        assert!(app.sidebar_open, "same breakpoint side keeps user toggle");
        update(&mut app, Action::Resize(200));
        assert!(!app.narrow);
        assert!(app.sidebar_open);
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), vec![Effect::Quit]);
    }
}
