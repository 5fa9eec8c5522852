//! Telegram transport: Bot API client, wire types and the update poller

mod error;
mod poller;
mod telegram;
pub mod types;

pub use error::TransportError;
pub use poller::Poller;
pub use telegram::TelegramClient;
