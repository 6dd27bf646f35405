//! HTTP routes: landing page, login initiator, OAuth callback.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, Request, State};
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use gglance_core::{INDEX_HTML, LOGIN_PATH, render_snapshot};
use gglance_providers::{ResourceFetcher, TokenExchanger};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span, warn};

use crate::error::CallbackError;
use crate::state::{STATE_COOKIE, StateGuard};

/// Path the provider redirects back to.
pub const CALLBACK_PATH: &str = "/GoogleCallback";

/// Shared, read-only state for all requests.
pub struct AppState {
    /// Builds authorization URLs and exchanges codes.
    pub exchanger: Arc<dyn TokenExchanger>,
    /// Reads calendar and drive data once a token is obtained.
    pub fetcher: Arc<dyn ResourceFetcher>,
    /// Issues and checks state tokens.
    pub states: StateGuard,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(
        exchanger: Arc<dyn TokenExchanger>,
        fetcher: Arc<dyn ResourceFetcher>,
        states: StateGuard,
    ) -> Self {
        Self {
            exchanger,
            fetcher,
            states,
        }
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(LOGIN_PATH, get(login))
        .route(CALLBACK_PATH, get(callback))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Request span without the query string, which carries the single-use
/// `code` and `state`.
fn request_span(request: &Request) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn login(State(app): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let state = app.states.issue();
    let url = app.exchanger.authorization_url(&state);
    info!("redirecting to authorization endpoint");

    let jar = if app.states.uses_cookie() {
        jar.add(state_cookie(state))
    } else {
        jar
    };
    (jar, Redirect::temporary(&url))
}

/// Query parameters the provider sends back.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

async fn callback(
    State(app): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Result<Html<String>, CallbackError>) {
    let cookie = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let result = handle_callback(&app, params, cookie.as_deref()).await;
    if let Err(ref err) = result {
        warn!(status = %err.status(), "callback failed: {}", err);
    }

    // The cookie outlives rejected callbacks; only a consumed token clears it.
    let state_consumed = !matches!(result, Err(CallbackError::InvalidState(_)));
    let jar = if app.states.uses_cookie() && state_consumed {
        jar.remove(Cookie::build(STATE_COOKIE).path("/"))
    } else {
        jar
    };
    (jar, result)
}

/// State check, then exchange, then delegate to the fetcher.
async fn handle_callback(
    app: &AppState,
    params: CallbackParams,
    cookie: Option<&str>,
) -> Result<Html<String>, CallbackError> {
    app.states
        .verify(params.state.as_deref(), cookie)
        .map_err(|reason| {
            warn!(reason = reason.as_str(), "rejecting callback state");
            CallbackError::InvalidState(reason)
        })?;

    if let Some(error) = params.error {
        return Err(CallbackError::AuthorizationDenied(error));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(CallbackError::MissingCode)?;

    let token = app
        .exchanger
        .exchange(&code)
        .await
        .map_err(CallbackError::Exchange)?;

    let snapshot = app
        .fetcher
        .fetch_resources(&token)
        .await
        .map_err(CallbackError::ResourceFetch)?;

    info!(
        events = snapshot.events.len(),
        files = snapshot.files.len(),
        "login complete"
    );
    Ok(Html(render_snapshot(&snapshot)))
}

fn state_cookie(value: String) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
