//! HTTP protocol layer
//!
//! Request parsing, handlers and response building.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Verb, bearer_token, parse_target};
pub use handlers::{handle_fs_request, handle_login, handle_logout};
