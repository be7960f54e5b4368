//! # Notevault MCP Server
//!
//! Exposes a markdown note vault to tool-calling agents over MCP.
//! Concurrent agent connections are multiplexed into isolated protocol
//! sessions by the [`session::SessionRouter`]; every read and write
//! passes the access gate; the edit tools turn approximate or
//! structural intent into exact, minimally-invasive content mutations.

pub mod http;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod session;
pub mod tools;
