//! # Application State
//!
//! Everything the client knows, owned by one `App` per session. No globals:
//! tests build as many independent instances as they like.
//!
//! ```text
//! App
//! ├── conversations: BTreeMap<id, Conversation>  // cache, mirrors the server
//! ├── active_conversation_id: Option<String>     // the one being shown
//! ├── thread: Vec<Message>                       // what the thread pane shows
//! ├── header_title: String                       // header line text
//! ├── sidebar_open / narrow: bool                // sidebar panel visibility
//! ├── toasts: Vec<Toast>                         // transient notifications
//! ├── ledger: RequestLedger                      // request tickets + in-flight count
//! └── settings: UiSettings                       // resolved UI knobs
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::config::ResolvedConfig;
use crate::core::model::{Conversation, Message, PLACEHOLDER_TITLE};
use crate::core::request::RequestLedger;
use crate::core::sidebar::{self, SidebarView};
use crate::core::toast::Toast;

#[derive(Debug, Clone)]
pub struct UiSettings {
    pub toast_ttl: Duration,
    pub error_toast_ttl: Duration,
    /// Terminal widths below this count as narrow.
    pub narrow_width: u16,
    pub show_sidebar: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            toast_ttl: Duration::from_millis(crate::core::config::DEFAULT_TOAST_MS),
            error_toast_ttl: Duration::from_millis(crate::core::config::DEFAULT_ERROR_TOAST_MS),
            narrow_width: crate::core::config::DEFAULT_NARROW_WIDTH,
            show_sidebar: true,
        }
    }
}

pub struct App {
    pub conversations: BTreeMap<String, Conversation>,
    pub active_conversation_id: Option<String>,
    pub thread: Vec<Message>,
    pub header_title: String,
    pub sidebar_open: bool,
    pub narrow: bool,
    pub toasts: Vec<Toast>,
    pub ledger: RequestLedger,
    pub settings: UiSettings,
    /// Set whenever a message node is inserted; the view scrolls to the end and clears it.
    pub scroll_to_end: bool,
    /// True once the first conversation list has been applied.
    pub bootstrapped: bool,
}

impl App {
    pub fn new(settings: UiSettings) -> Self {
        Self {
            conversations: BTreeMap::new(),
            active_conversation_id: None,
            thread: Vec::new(),
            header_title: PLACEHOLDER_TITLE.to_string(),
            sidebar_open: settings.show_sidebar,
            narrow: false,
            toasts: Vec::new(),
            ledger: RequestLedger::new(),
            settings,
            scroll_to_end: false,
            bootstrapped: false,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(UiSettings {
            toast_ttl: config.toast_ttl,
            error_toast_ttl: config.error_toast_ttl,
            narrow_width: config.narrow_width,
            show_sidebar: config.show_sidebar,
        })
    }

    /// Loading indicator: visible while any request is unsettled.
    pub fn is_loading(&self) -> bool {
        self.ledger.in_flight() > 0
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation_id
            .as_ref()
            .and_then(|id| self.conversations.get(id))
    }

    pub fn sidebar(&self) -> SidebarView {
        sidebar::project(&self.conversations, self.active_conversation_id.as_deref())
    }
}
