//! Core chat components
//!
//! Sessions hold per-browser state; the dispatcher turns page events into
//! new session state and a view to render.

mod dispatch;
mod session;

pub use dispatch::{
    ChatEngine, ChatError, Event, Rating, SuggestionButton, SuggestionLayout, TranscriptPair,
    View,
};
pub use session::SessionStore;
