//! RAX Storage Server
//!
//! Serves named filesystem roots over HTTP, gating every read and write behind
//! group permissions and revocable session tokens.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod storage;

pub use server::{AppState, Server};
