//! WAN-Watch: public IP change notifier
//!
//! A library for polling the host's public IP address, remembering the
//! last one seen, and posting a message to a chat channel when it changes.

pub mod config;
pub mod monitor;
pub mod network;
pub mod notify;
pub mod query;
pub mod state;
pub mod time;
pub mod transport;
