//! # Core Client Logic
//!
//! The conversation cache, the thread being shown, and the rules for
//! folding server replies back into them. It knows nothing about any
//! specific UI technology and performs no I/O.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │                         │
//!                    │  • App (client state)   │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect::Request
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │  ── Action::Completed ─▶ │    API     │
//!     │  Adapter   │  ◀─────────────────────  │  (reqwest) │
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: `Conversation` and `Message`, shaped like the server's JSON
//! - [`state`]: The `App` struct, all client state in one place
//! - [`action`]: The `Action` enum and `update()` reconciliation
//! - [`request`]: Tickets that let late responses be recognized and dropped
//! - [`sidebar`]: Projection of the cache into sidebar rows
//! - [`toast`]: Transient notifications
//! - [`config`]: Layered settings

pub mod action;
pub mod config;
pub mod model;
pub mod request;
pub mod sidebar;
pub mod state;
pub mod toast;
