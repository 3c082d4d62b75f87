//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built fresh every frame from `App` data:
//! - `Header`: conversation title, loading spinner, key hints
//! - `Message`: one message bubble
//! - `ToastStack`: notification overlay
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it for
//! rendering:
//! - `InputBox`: auto-growing composer, emits `InputEvent::Submit`
//! - `MessageList` / `MessageListState`: scrollable thread with layout caching
//! - `Sidebar` / `SidebarState`: conversation list, emits `SidebarEvent`
//!
//! Components receive external data as props and never reach into `App`
//! themselves, which keeps each one testable against a `TestBackend`.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── header.rs        (top line)
//! ├── sidebar.rs       (conversation list panel)
//! ├── message.rs       (single message renderer)
//! ├── message_list.rs  (scrollable message container)
//! ├── input_box/       (composer + row layout)
//! └── toast.rs         (notification overlay)
//! ```

pub mod header;
pub mod input_box;
pub mod message;
pub mod message_list;
pub mod sidebar;
pub mod toast;

pub use header::Header;
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarHit, SidebarState};
pub use toast::ToastStack;
