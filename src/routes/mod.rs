//! HTTP routes
//!
//! `GET /` renders the page. Browser forms post to `/events` and are
//! redirected back to `/`; scripts can post the same events as JSON to
//! `/api/events` and get the view back.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::core::{ChatError, Event, Rating, View};
use crate::AppState;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "smarttour_session";

/// Cookie written by the viewport width script
pub const WIDTH_COOKIE: &str = "screen_width";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Kept as text so a malformed value falls back instead of rejecting
    /// the page
    pub screen_width: Option<String>,
}

/// Flat form encoding of an [`Event`]; `action` picks the variant
#[derive(Debug, Deserialize)]
pub struct EventForm {
    pub action: String,
    pub text: Option<String>,
    pub index: Option<usize>,
    pub option: Option<String>,
    pub pair: Option<usize>,
    pub rating: Option<String>,
    pub width: Option<u32>,
}

impl TryFrom<EventForm> for Event {
    type Error = ChatError;

    fn try_from(form: EventForm) -> Result<Self, Self::Error> {
        let missing = |field: &str| ChatError::InvalidEvent(format!("{} needs '{}'", form.action, field));

        let event = match form.action.as_str() {
            "submit" => Event::Submit {
                text: form.text.clone().unwrap_or_default(),
            },
            "quick_suggestion" => Event::QuickSuggestion {
                index: form.index.ok_or_else(|| missing("index"))?,
            },
            "select_filter" => Event::SelectFilter {
                option: form.option.clone().unwrap_or_default(),
            },
            "request_itinerary" => Event::RequestItinerary,
            "clear" => Event::Clear,
            "feedback" => Event::Feedback {
                pair: form.pair.ok_or_else(|| missing("pair"))?,
                rating: match form.rating.as_deref() {
                    Some("like") => Rating::Like,
                    Some("okay") => Rating::Okay,
                    Some("dislike") => Rating::Dislike,
                    _ => return Err(missing("rating")),
                },
            },
            "report_viewport" => Event::ReportViewport {
                width: form.width.ok_or_else(|| missing("width"))?,
            },
            other => return Err(ChatError::InvalidEvent(format!("unknown action '{}'", other))),
        };
        Ok(event)
    }
}

fn error_status(error: &ChatError) -> StatusCode {
    match error {
        ChatError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
        ChatError::Provider(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (error_status(&self), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| c.value().parse().ok())
}

fn remember_session(jar: CookieJar, id: Uuid) -> CookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Run one event against the caller's session, saving the new state only
/// when the event succeeds.
async fn apply(
    state: &AppState,
    jar: &CookieJar,
    event: Event,
) -> (Uuid, Result<View, ChatError>) {
    let (id, slot) = state.sessions.acquire(session_id(jar)).await;
    let mut session = slot.lock().await;

    let result = match state.engine.dispatch(session.clone(), event).await {
        Ok((next, view)) => {
            *session = next;
            Ok(view)
        }
        Err(e) => {
            tracing::warn!(session = %id, error = %e, "Event failed");
            Err(e)
        }
    };
    state.sessions.touch(id).await;
    (id, result)
}

fn render_page(state: &AppState, view: &View, width_reported: bool) -> Response {
    match state.renderer.page(view, width_reported) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

fn render_error(state: &AppState, error: &ChatError) -> Response {
    let status = error_status(error);
    match state.renderer.error(&error.to_string()) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            (status, error.to_string()).into_response()
        }
    }
}

async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> (CookieJar, Response) {
    let reported_width = query
        .screen_width
        .as_deref()
        .and_then(|w| w.parse::<u32>().ok())
        .or_else(|| {
            jar.get(WIDTH_COOKIE)
                .and_then(|c| c.value().parse().ok())
        });

    let (id, slot) = state.sessions.acquire(session_id(&jar)).await;
    let mut session = slot.lock().await;

    let response = match reported_width {
        Some(width) if session.viewport_width != Some(width) => {
            match state
                .engine
                .dispatch(session.clone(), Event::ReportViewport { width })
                .await
            {
                Ok((next, view)) => {
                    *session = next;
                    render_page(&state, &view, true)
                }
                Err(e) => render_error(&state, &e),
            }
        }
        _ => {
            let view = state.engine.view(&session);
            render_page(&state, &view, session.viewport_width.is_some())
        }
    };

    (remember_session(jar, id), response)
}

async fn form_event(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> (CookieJar, Response) {
    let event = match Event::try_from(form) {
        Ok(event) => event,
        Err(e) => return (jar, render_error(&state, &e)),
    };

    let (id, result) = apply(&state, &jar, event).await;
    let response = match result {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => render_error(&state, &e),
    };
    (remember_session(jar, id), response)
}

async fn api_event(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(event): Json<Event>,
) -> (CookieJar, Result<Json<View>, ChatError>) {
    let (id, result) = apply(&state, &jar, event).await;
    (
        remember_session(jar, id),
        result.map(Json),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/events", post(form_event))
        .route("/api/events", post(api_event))
        .route("/health", get(health))
}
