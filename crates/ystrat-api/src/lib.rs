//! Local HTTP playground for the strategy pipeline.
//!
//! Unauthenticated by design: the server binds to loopback only.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
