//! # Web Surface
//!
//! axum router serving the chat page, the transcript API and the streamed
//! replies as server-sent events.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use sessions::SessionStore;
pub use state::AppState;
