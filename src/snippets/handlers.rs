use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{middleware::require_authentication, AuthContext},
    error::AppError,
    forms::Form,
    session::Session,
    state::AppState,
    templates::{render, SnippetView, TemplateData},
};

pub const EXPIRY_OPTIONS: [&str; 3] = ["365", "7", "1"];

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/snippet/:id", get(show_snippet))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/snippet/create", get(create_snippet_form).post(create_snippet))
        .route_layer(middleware::from_fn(require_authentication))
}

#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let snippets = state.snippets.latest().await?;
    let data = TemplateData {
        snippets: snippets.into_iter().map(SnippetView::from).collect(),
        ..Default::default()
    };
    Ok(render(&state, &session, auth, "home.html", data)?.into_response())
}

/// Ids that are not positive integers are treated as missing pages.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

#[instrument(skip(state, session))]
pub async fn show_snippet(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id).ok_or(AppError::NotFound)?;
    let snippet = state.snippets.get(id).await?;
    let data = TemplateData {
        snippet: Some(snippet.into()),
        ..Default::default()
    };
    Ok(render(&state, &session, auth, "show.html", data)?.into_response())
}

#[instrument(skip(state, session))]
pub async fn create_snippet_form(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let data = TemplateData::with_form(Form::default());
    Ok(render(&state, &session, auth, "create.html", data)?.into_response())
}

#[instrument(skip(state, session, values))]
pub async fn create_snippet(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    axum::Form(values): axum::Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mut form = Form::new(values);
    form.required(&["title", "content", "expires"]);
    form.max_length("title", 100);
    form.permitted_values("expires", &EXPIRY_OPTIONS);

    if !form.valid() {
        let data = TemplateData::with_form(form);
        return Ok(render(&state, &session, auth, "create.html", data)?.into_response());
    }

    let expires_days: i32 = form
        .get("expires")
        .parse()
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
    let id = state
        .snippets
        .insert(form.get("title"), form.get("content"), expires_days)
        .await?;

    info!(snippet_id = id, user_id = ?auth.user_id, "snippet created");
    session.put_flash("Snippet successfully created!");
    Ok(Redirect::to(&format!("/snippet/{}", id)).into_response())
}
