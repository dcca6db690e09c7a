//! Request handlers for the event pages.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Local;
use tokio::sync::RwLock;

use crate::forms::{Event, EventForm, EventFormData};
use crate::pages;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<RwLock<Vec<Event>>>,
    /// One token per process, rendered into the form's hidden input.
    /// Token checking belongs to session middleware this demo does not
    /// carry.
    pub csrf_token: Arc<String>,
}

impl AppState {
    pub fn new() -> Self {
        let token: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(32)
            .collect();
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            csrf_token: Arc::new(token),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn root() -> Redirect {
    Redirect::to("/events/")
}

/// The event list: events that have not yet finished, soonest start
/// first. Finished events stay in the store but drop off the page.
pub async fn event_index(State(state): State<AppState>) -> Html<String> {
    let today = Local::now().date_naive();
    let events = state.events.read().await;
    let mut upcoming: Vec<Event> = events
        .iter()
        .filter(|event| event.finish_date >= today)
        .cloned()
        .collect();
    upcoming.sort_by_key(|event| event.start_date);
    Html(pages::event_index_page(&upcoming))
}

pub async fn event_create_form(State(state): State<AppState>) -> Html<String> {
    Html(pages::event_create_page(
        &EventForm::empty(),
        &state.csrf_token,
    ))
}

/// Handle a form submission: store the event and redirect, or re-render
/// the form carrying the validation messages.
pub async fn event_create_submit(
    State(state): State<AppState>,
    Form(data): Form<EventFormData>,
) -> Response {
    let mut form = EventForm::bind(&data);
    match form.validate() {
        Some(event) => {
            tracing::info!(name = %event.name, slug = %event.slug, "Event created");
            state.events.write().await.push(event);
            Redirect::to("/events/").into_response()
        }
        // An invalid submission is still a served page, not an error
        // status.
        None => Html(pages::event_create_page(&form, &state.csrf_token)).into_response(),
    }
}
