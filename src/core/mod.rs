//! # Core Session Logic
//!
//! This module contains Spark's business logic.
//! It knows nothing about terminals, HTTP, or the generative service.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session (state)      │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Effect (work to do)  │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                                ▼
//!                    ┌─────────────────────────┐
//!                    │  runtime::SessionRuntime│
//!                    │  spawns content calls,  │
//!                    │  feeds Actions back     │
//!                    └─────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `Session` struct, all session state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`profile`], [`chat`]: the records the session is made of
//! - [`config`]: settings file and environment resolution

pub mod action;
pub mod chat;
pub mod config;
pub mod profile;
pub mod state;

#[cfg(test)]
mod proptests;

pub use action::{Action, Effect, LoadPurpose, update};
pub use chat::{ChatMessage, Sender};
pub use profile::Profile;
pub use state::{DeckSettings, Session, View};
