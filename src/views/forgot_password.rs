use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::reset::{RequestOutcome, ResetError, Resolution};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "forgot_password/request.html")]
struct RequestTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
    route: &'a str,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "forgot_password/sent.html")]
struct SentTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
}

#[derive(Template)]
#[template(path = "forgot_password/new_password.html")]
struct NewPasswordTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
    route: &'a str,
    token: String,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "forgot_password/link_expired.html")]
struct LinkExpiredTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
    route: &'a str,
}

#[derive(Template)]
#[template(path = "forgot_password/changed.html")]
struct ChangedTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
}

#[derive(Template)]
#[template(path = "forgot_password/not_found.html")]
struct NotFoundTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
}

#[derive(Template)]
#[template(path = "forgot_password/error.html")]
struct ErrorTemplate<'a> {
    title: &'a str,
    app_name: &'a str,
}

/// Served when even the error template fails to render.
const FALLBACK_ERROR_PAGE: &str = "<!DOCTYPE html><html><head><title>Error</title></head>\
<body><h1>Something went wrong</h1></body></html>";

/// A reset that failed on infrastructure. Logged, then shown as an HTML 500.
#[derive(Debug)]
pub struct PageError {
    app_name: String,
    source: ResetError,
}

impl PageError {
    fn new(state: &SharedState, source: ResetError) -> Self {
        Self {
            app_name: state.config.app_name.clone(),
            source,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("Password reset failed: {}", self.source);
        render(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorTemplate {
                title: "Something went wrong",
                app_name: &self.app_name,
            },
        )
    }
}

#[derive(Deserialize)]
pub struct RequestForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct NewPasswordForm {
    #[serde(default)]
    pub password: String,
}

fn render<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(FALLBACK_ERROR_PAGE)).into_response()
        }
    }
}

pub async fn request_page(State(state): State<SharedState>) -> Response {
    render(
        StatusCode::OK,
        RequestTemplate {
            title: "Forgot password",
            app_name: &state.config.app_name,
            route: &state.config.forgot_password.route,
            error: None,
        },
    )
}

pub async fn request_submit(
    State(state): State<SharedState>,
    Form(form): Form<RequestForm>,
) -> Result<Response, PageError> {
    let app_name = &state.config.app_name;

    let outcome = state
        .coordinator
        .request_reset(&form.email)
        .await
        .map_err(|e| PageError::new(&state, e))?;

    match outcome {
        RequestOutcome::Sent => Ok(render(
            StatusCode::OK,
            SentTemplate {
                title: "Forgot password",
                app_name,
            },
        )),
        RequestOutcome::InvalidInput(msg) => Ok(render(
            StatusCode::FORBIDDEN,
            RequestTemplate {
                title: "Forgot password",
                app_name,
                route: &state.config.forgot_password.route,
                error: Some(msg),
            },
        )),
    }
}

pub async fn new_password_page(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Response, PageError> {
    let resolution = state
        .coordinator
        .resolve_token(&token)
        .await
        .map_err(|e| PageError::new(&state, e))?;
    Ok(page_for(&state, resolution, token))
}

pub async fn new_password_submit(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Form(form): Form<NewPasswordForm>,
) -> Result<Response, PageError> {
    let resolution = state
        .coordinator
        .complete_reset(&token, &form.password)
        .await
        .map_err(|e| PageError::new(&state, e))?;
    Ok(page_for(&state, resolution, token))
}

fn page_for(state: &SharedState, resolution: Resolution, token: String) -> Response {
    let app_name = &state.config.app_name;
    let route = &state.config.forgot_password.route;

    match resolution {
        Resolution::Valid(token) => render(
            StatusCode::OK,
            NewPasswordTemplate {
                title: "Choose a new password",
                app_name,
                route,
                token,
                error: None,
            },
        ),
        Resolution::InvalidInput(msg) => render(
            StatusCode::FORBIDDEN,
            NewPasswordTemplate {
                title: "Choose a new password",
                app_name,
                route,
                token,
                error: Some(msg),
            },
        ),
        Resolution::Success => render(
            StatusCode::OK,
            ChangedTemplate {
                title: "Password changed",
                app_name,
            },
        ),
        Resolution::Expired => render(
            StatusCode::OK,
            LinkExpiredTemplate {
                title: "Forgot password - Link expired",
                app_name,
                route,
            },
        ),
        Resolution::NotFound => render(
            StatusCode::NOT_FOUND,
            NotFoundTemplate {
                title: "Page not found",
                app_name,
            },
        ),
    }
}
