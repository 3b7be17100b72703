//! Request routing.
//!
//! | Route            | Effect                                        |
//! |------------------|-----------------------------------------------|
//! | `GET /`          | Render the session's current view.            |
//! | `POST /login`    | `LoginSubmit`, then `303` to `/`.             |
//! | `POST /generate` | `GenerateSubmit`, then `303` to `/`.          |
//! | `POST /logout`   | `LogoutClick`, then `303` to `/`.             |
//! | `GET /healthz`   | `200 ok`; does not touch sessions.            |
//!
//! Anything else is `404`, or `405` for a known path with the wrong method.
//! The session is carried in the [`SESSION_COOKIE`] cookie; a request without
//! a live session id gets a new session and a `Set-Cookie` header.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use newsroom::{SessionEvent, SessionId};
use nodes::Newsdesk;
use tracing::{debug, warn};

use crate::{forms, render};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "newsdesk_session";

/// Largest accepted form body.
pub const MAX_FORM_BYTES: usize = 64 * 1024;

/// Response type produced by every route.
pub type HttpResponse = Response<Full<Bytes>>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Routes one request against `desk`.
pub async fn handle<B>(desk: &Newsdesk, request: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/healthz") => text(StatusCode::OK, "ok"),
        (&Method::GET, "/") => {
            let (id, created) = desk.resolve(session_cookie(&request)).await;
            let view = desk.view(id).await;
            with_session_cookie(html(render::page(&view)), id, created)
        }
        (&Method::POST, "/login" | "/generate" | "/logout") => {
            let candidate = session_cookie(&request);
            let body = match read_form(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            let event = match path.as_str() {
                "/login" => forms::login_event(&body),
                "/generate" => SessionEvent::GenerateSubmit(forms::article_form(&body)),
                _ => SessionEvent::LogoutClick,
            };
            let (id, created) = desk.resolve(candidate).await;
            desk.dispatch(id, event).await;
            with_session_cookie(see_other("/"), id, created)
        }
        (_, "/" | "/healthz" | "/login" | "/generate" | "/logout") => {
            text(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
        }
        _ => text(StatusCode::NOT_FOUND, "not found"),
    };

    debug!(%method, %path, status = response.status().as_u16(), "request handled");
    response
}

fn session_cookie<B>(request: &Request<B>) -> Option<SessionId> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value.trim()))
}

async fn read_form<B>(request: Request<B>) -> Result<Bytes, HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match Limited::new(request.into_body(), MAX_FORM_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(limit = MAX_FORM_BYTES, "form body too large");
            Err(text(StatusCode::PAYLOAD_TOO_LARGE, "form too large"))
        }
        Err(err) => {
            warn!(error = %err, "could not read form body");
            Err(text(StatusCode::BAD_REQUEST, "could not read form body"))
        }
    }
}

fn response(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn text(status: StatusCode, body: &'static str) -> HttpResponse {
    response(status, "text/plain; charset=utf-8", body)
}

fn html(body: String) -> HttpResponse {
    response(StatusCode::OK, "text/html; charset=utf-8", body)
}

fn see_other(location: &'static str) -> HttpResponse {
    let mut response = response(StatusCode::SEE_OTHER, "text/plain; charset=utf-8", "");
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(location));
    response
}

fn with_session_cookie(mut response: HttpResponse, id: SessionId, created: bool) -> HttpResponse {
    if created {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}
