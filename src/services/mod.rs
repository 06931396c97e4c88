pub mod auth_service;
pub mod media_service;
pub mod message_service;
pub mod token_service;

pub use media_service::*;
pub use token_service::*;
