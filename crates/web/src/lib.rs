//! Newsdesk HTTP surface.
//!
//! Serves the login page, the article form and the result pane over HTTP/1,
//! and provides the file-backed [`newsroom::ClickLog`].
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`server`]    | Accept loop, per-connection tasks, graceful shutdown. |
//! | [`routes`]    | Path/method routing and the session cookie.           |
//! | [`forms`]     | Form bodies → [`newsroom::SessionEvent`]s.            |
//! | [`render`]    | [`newsroom::View`] → HTML.                            |
//! | [`click_log`] | [`FileClickLog`].                                     |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Sockets, HTTP parsing and file I/O live here. Session
//! semantics stay in [`newsroom`] and [`nodes`]; this crate only translates
//! requests into events and views into pages.

pub mod click_log;
pub mod forms;
pub mod render;
pub mod routes;
pub mod server;

pub use click_log::{FileClickLog, DEFAULT_CLICK_LOG_PATH};
pub use routes::{handle, SESSION_COOKIE};
pub use server::{bind, serve, ServerError};
