//! Change detection between the saved and the freshly fetched address.

use std::time::SystemTime;

use crate::network::AddressValue;

/// A detected change of the public address.
///
/// Produced once per change and consumed immediately by the notifier;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The last known address, or `None` on the first run.
    pub previous: Option<AddressValue>,
    /// The freshly fetched address.
    pub current: AddressValue,
    /// When the change was detected.
    pub detected_at: SystemTime,
}

impl ChangeEvent {
    /// Creates a first-run event announcing `current`.
    #[must_use]
    pub const fn first_run(current: AddressValue, detected_at: SystemTime) -> Self {
        Self {
            previous: None,
            current,
            detected_at,
        }
    }

    /// Creates an event for a change from `previous` to `current`.
    #[must_use]
    pub const fn changed(
        previous: AddressValue,
        current: AddressValue,
        detected_at: SystemTime,
    ) -> Self {
        Self {
            previous: Some(previous),
            current,
            detected_at,
        }
    }

    /// Returns true if there was no previously known address.
    #[must_use]
    pub const fn is_first_run(&self) -> bool {
        self.previous.is_none()
    }

    /// Renders the built-in notification text.
    ///
    /// First runs use startup framing announcing the current address;
    /// changes name both the old and the new address.
    #[must_use]
    pub fn default_message(&self) -> String {
        match &self.previous {
            None => format!(
                "🟢 Bot started – current public IP is **{}**.",
                self.current
            ),
            Some(previous) => format!(
                "⚠️ Public IP **changed** from `{previous}` to **{}**.",
                self.current
            ),
        }
    }
}

/// Outcome of comparing the saved address with the fetched one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The address is unchanged; nothing to do.
    NoAction,
    /// The address is new; persist it and notify.
    Notify(ChangeEvent),
}

/// Decides whether `current` warrants a notification.
///
/// This is a pure function: string equality against `previous` is the only
/// input, and no I/O is performed.
///
/// - equal to `previous` → [`Decision::NoAction`]
/// - `previous` absent → first-run event
/// - otherwise → change event naming both addresses
#[must_use]
pub fn decide(
    previous: Option<&AddressValue>,
    current: &AddressValue,
    detected_at: SystemTime,
) -> Decision {
    match previous {
        Some(prev) if prev == current => Decision::NoAction,
        None => Decision::Notify(ChangeEvent::first_run(current.clone(), detected_at)),
        Some(prev) => Decision::Notify(ChangeEvent::changed(
            prev.clone(),
            current.clone(),
            detected_at,
        )),
    }
}
