//! Presence tracking and live delivery over WebSockets.

pub mod events;
pub mod fanout;
pub mod presence;
pub mod session;

pub use events::ServerEvent;
pub use fanout::{Delivery, Fanout};
pub use presence::{ConnectionHandle, LocalPresence, PresenceRegistry};
pub use session::WsSession;
