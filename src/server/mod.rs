//! Server core functionality
//!
//! Application state, routing, and the listener loop.

pub mod core;
pub mod state;

pub use self::core::{Server, build_router};
pub use state::AppState;
