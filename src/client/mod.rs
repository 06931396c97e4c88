//! Client-side chat state driven by HTTP responses and realtime frames.

pub mod state;

pub use state::{ChatState, ClientAction};
