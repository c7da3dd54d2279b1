//! Notification layer for posting messages to a chat channel.
//!
//! This module provides:
//! - The destination identifier ([`ChannelId`])
//! - The notifier abstraction ([`Notifier`])
//! - The Discord REST implementation ([`ChannelNotifier`])
//! - Error handling ([`NotifyError`])

mod destination;
mod error;
mod sender;

pub use destination::{ChannelId, ParseChannelIdError};
pub use error::NotifyError;
pub use sender::{ChannelNotifier, DEFAULT_API_BASE, DEFAULT_SEND_TIMEOUT, Notifier};
