//! HTTP surface for the dualcast forecast and advice services.
//!
//! Handlers are thin: they decode the body, hand the blocking pipeline to
//! `spawn_blocking`, and map the result onto a status code and JSON body.
//!
//! - [`app`]: router, middleware and listener
//! - [`state`]: shared service handles
//! - [`error`]: error to `{"error": message}` mapping
//! - [`routes`]: health, forecast and analyze handlers

pub mod app;
pub mod error;
pub mod routes;
pub mod state;

pub use app::{create_app, serve};
pub use error::AppError;
pub use state::AppState;
