//! Two-user realtime chat backend: accounts, persisted conversations and
//! live delivery of messages and presence over WebSockets.

pub mod api;
pub mod client;
pub mod config;
pub mod database;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod services;
pub mod state;
pub mod utils;
