//! Monitor layer for detecting and announcing public address changes.
//!
//! This module provides:
//! - Change events and the pure decision function ([`ChangeEvent`], [`decide`])
//! - Message rendering ([`MessageFormat`])
//! - The interval-driven loop ([`Poller`], [`TickOutcome`])

mod change;
mod message;
mod poller;


pub use change::{ChangeEvent, Decision, decide};
pub use message::{MessageFormat, TemplateError};
pub use poller::{Poller, TickOutcome};
