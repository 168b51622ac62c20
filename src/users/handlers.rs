use std::collections::HashMap;

use axum::{
    extract::State,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        middleware::{redirect_if_authenticated, require_authentication, LOGIN_PATH},
        AuthContext,
    },
    error::{AppError, StoreError},
    forms::{Form, EMAIL_RE, GENERIC_ERROR},
    session::Session,
    state::AppState,
    templates::{render, TemplateData},
};

pub fn guest_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", get(signup_user_form).post(signup_user))
        .route("/user/login", get(login_user_form).post(login_user))
        .route_layer(middleware::from_fn(redirect_if_authenticated))
}

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/user/logout", post(logout_user))
        .route_layer(middleware::from_fn(require_authentication))
}

#[instrument(skip(state, session))]
pub async fn signup_user_form(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let data = TemplateData::with_form(Form::default());
    Ok(render(&state, &session, auth, "signup.html", data)?.into_response())
}

#[instrument(skip(state, session, values))]
pub async fn signup_user(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    axum::Form(values): axum::Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mut form = Form::new(values);
    form.required(&["name", "email", "password"]);
    form.max_length("name", 255);
    form.max_length("email", 255);
    form.matches_pattern("email", &EMAIL_RE);
    form.min_length("password", 10);

    if !form.valid() {
        let data = TemplateData::with_form(form);
        return Ok(render(&state, &session, auth, "signup.html", data)?.into_response());
    }

    let inserted = state
        .users
        .insert(form.get("name"), form.get("email"), form.get("password"))
        .await;
    match inserted {
        Ok(()) => {}
        Err(StoreError::DuplicateEmail) => {
            warn!("signup with email already in use");
            form.errors.add("email", "Email address is already in use");
            let data = TemplateData::with_form(form);
            return Ok(render(&state, &session, auth, "signup.html", data)?.into_response());
        }
        Err(e) => return Err(e.into()),
    }

    info!("user signed up");
    session.put_flash("Your signup was successful. Please log in.");
    Ok(Redirect::to(LOGIN_PATH).into_response())
}

#[instrument(skip(state, session))]
pub async fn login_user_form(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let data = TemplateData::with_form(Form::default());
    Ok(render(&state, &session, auth, "login.html", data)?.into_response())
}

#[instrument(skip(state, session, values))]
pub async fn login_user(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    axum::Form(values): axum::Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mut form = Form::new(values);
    form.required(&["email", "password"]);

    if !form.valid() {
        let data = TemplateData::with_form(form);
        return Ok(render(&state, &session, auth, "login.html", data)?.into_response());
    }

    let authenticated = state
        .users
        .authenticate(form.get("email"), form.get("password"))
        .await;
    let user_id = match authenticated {
        Ok(id) => id,
        Err(StoreError::InvalidCredentials) => {
            warn!("login with invalid credentials");
            form.errors.add(GENERIC_ERROR, "Email or Password is incorrect");
            let data = TemplateData::with_form(form);
            return Ok(render(&state, &session, auth, "login.html", data)?.into_response());
        }
        Err(e) => return Err(e.into()),
    };

    session.login(user_id);
    info!(user_id, "user logged in");
    session.put_flash("You've been logged in successfully!");
    Ok(Redirect::to("/snippet/create").into_response())
}

#[instrument(skip(session))]
pub async fn logout_user(session: Session, auth: AuthContext) -> Response {
    session.logout();
    info!(user_id = ?auth.user_id, "user logged out");
    session.put_flash("You've been logged out successfully!");
    Redirect::to("/").into_response()
}
