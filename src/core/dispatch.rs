//! Event dispatch
//!
//! Every page interaction becomes an [`Event`]. [`ChatEngine::dispatch`]
//! takes the current session state and the event and returns the next state
//! together with the [`View`] to render. Only `Submit` reaches the chat
//! provider; everything else is a pure state change.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::conversation::SidebarEntry;
use crate::providers::{ChatCall, ChatProvider, ProviderError};

use super::session::Session;

/// Width assumed when the viewport script has not reported one
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1200;

/// Below this width quick suggestions are stacked one per row
pub const NARROW_VIEWPORT: u32 = 768;

const GRID_COLUMNS: usize = 3;

/// Something the user did on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The chat form was submitted
    Submit { text: String },
    /// A quick suggestion button was clicked
    QuickSuggestion { index: usize },
    /// A destination type was picked; the empty option means none
    SelectFilter { option: String },
    /// The custom itinerary button was clicked
    RequestItinerary,
    /// The clear chat button was clicked
    Clear,
    /// A feedback button under a reply was clicked
    Feedback { pair: usize, rating: Rating },
    /// The viewport script reported the window width
    ReportViewport { width: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Like,
    Okay,
    Dislike,
}

impl Rating {
    pub fn glyph(self) -> &'static str {
        match self {
            Rating::Like => "👍",
            Rating::Okay => "👌",
            Rating::Dislike => "👎",
        }
    }
}

/// Errors from dispatching an event
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionLayout {
    /// One full-text button per row, for narrow screens
    Stacked,
    /// Short labels, three per row
    Grid,
}

impl SuggestionLayout {
    pub fn for_width(width: u32) -> Self {
        if width < NARROW_VIEWPORT {
            SuggestionLayout::Stacked
        } else {
            SuggestionLayout::Grid
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionButton {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptPair {
    /// Position in display order, newest first
    pub index: usize,
    pub user: String,
    pub assistant: String,
}

/// Everything needed to draw the page
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub title: String,
    pub subtitle: String,
    pub welcome: String,
    pub intro: String,
    pub layout: SuggestionLayout,
    pub suggestion_rows: Vec<Vec<SuggestionButton>>,
    pub filter_options: Vec<String>,
    pub pending_input: String,
    pub transcript: Vec<TranscriptPair>,
    pub sidebar: Vec<SidebarEntry>,
}

/// Applies events to sessions
pub struct ChatEngine {
    provider: Arc<dyn ChatProvider>,
    site: Arc<SiteConfig>,
}

impl ChatEngine {
    pub fn new(provider: Arc<dyn ChatProvider>, site: Arc<SiteConfig>) -> Self {
        Self { provider, site }
    }

    /// Apply `event` to `session`.
    ///
    /// On error the caller keeps the state it had before the event; the
    /// partially updated session is dropped.
    pub async fn dispatch(
        &self,
        mut session: Session,
        event: Event,
    ) -> Result<(Session, View), ChatError> {
        match event {
            Event::Submit { text } => {
                if text.trim().is_empty() {
                    tracing::debug!(session = %session.id, "Ignoring blank submission");
                } else {
                    self.submit(&mut session, &text).await?;
                }
            }
            Event::QuickSuggestion { index } => {
                let suggestion = self.site.suggestions.get(index).ok_or_else(|| {
                    ChatError::InvalidEvent(format!("no quick suggestion at index {}", index))
                })?;
                session.pending_input.clone_from(&suggestion.prompt);
            }
            Event::SelectFilter { option } => {
                if !option.is_empty() {
                    session.pending_input = crate::config::prompts::filter_prompt(&option);
                }
            }
            Event::RequestItinerary => {
                session.pending_input.clone_from(&self.site.itinerary.prompt);
            }
            Event::Clear => {
                session.conversation.clear();
                session.pending_input.clear();
                tracing::debug!(session = %session.id, "Conversation cleared");
            }
            Event::Feedback { pair, rating } => {
                tracing::debug!(
                    session = %session.id,
                    pair,
                    rating = rating.glyph(),
                    "Feedback received"
                );
            }
            Event::ReportViewport { width } => {
                session.viewport_width = Some(width);
            }
        }

        let view = self.view(&session);
        Ok((session, view))
    }

    async fn submit(&self, session: &mut Session, text: &str) -> Result<(), ChatError> {
        session.conversation.add_user(text);

        let reply = self
            .provider
            .chat(ChatCall {
                model: &self.site.llm.model,
                message: text,
                temperature: self.site.llm.temperature,
                history: session.conversation.messages(),
            })
            .await?;

        session.conversation.add_assistant(&reply);
        session.pending_input.clear();
        Ok(())
    }

    /// Build the view for a session without changing it
    pub fn view(&self, session: &Session) -> View {
        let width = session.viewport_width.unwrap_or(DEFAULT_VIEWPORT_WIDTH);
        let layout = SuggestionLayout::for_width(width);

        let buttons = self.site.suggestions.iter().enumerate().map(|(index, s)| {
            SuggestionButton {
                index,
                text: match layout {
                    SuggestionLayout::Stacked => s.prompt.clone(),
                    SuggestionLayout::Grid => s.label.clone(),
                },
            }
        });
        let suggestion_rows = match layout {
            SuggestionLayout::Stacked => buttons.map(|b| vec![b]).collect(),
            SuggestionLayout::Grid => buttons
                .collect::<Vec<_>>()
                .chunks(GRID_COLUMNS)
                .map(<[_]>::to_vec)
                .collect(),
        };

        let transcript = session
            .conversation
            .paired_turns()
            .rev()
            .enumerate()
            .map(|(index, pair)| TranscriptPair {
                index,
                user: pair.user.content.clone(),
                assistant: pair.assistant.content.clone(),
            })
            .collect();

        let page = &self.site.page;
        View {
            title: page.title.clone(),
            subtitle: page.subtitle.clone(),
            welcome: page.welcome.clone(),
            intro: page.intro.clone(),
            layout,
            suggestion_rows,
            filter_options: self.site.filters.options.clone(),
            pending_input: session.pending_input.clone(),
            transcript,
            sidebar: session.conversation.sidebar_summaries().collect(),
        }
    }
}
