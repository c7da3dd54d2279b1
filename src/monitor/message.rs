//! Notification text rendering.

use std::time::UNIX_EPOCH;

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

use super::ChangeEvent;
use crate::network::AddressValue;

const STARTUP: &str = "startup";
const CHANGE: &str = "change";

/// Error type for message templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template does not compile.
    #[error("Invalid {name} template: {reason}")]
    Compile {
        /// Which template failed (`startup` or `change`).
        name: &'static str,
        /// Parser error message.
        reason: String,
    },

    /// Rendering a compiled template failed.
    #[error("Failed to render {name} template: {reason}")]
    Render {
        /// Which template failed (`startup` or `change`).
        name: &'static str,
        /// Renderer error message.
        reason: String,
    },
}

/// Turns a [`ChangeEvent`] into notification text.
///
/// Without templates the built-in framing from
/// [`ChangeEvent::default_message`] is used. Either message can be replaced
/// by a Handlebars template; available variables:
/// - `current`: the new address
/// - `previous`: the old address (absent on first run)
/// - `first_run`: boolean
/// - `timestamp`: Unix timestamp (seconds) of detection
///
/// Output is not HTML-escaped; chat messages are plain markdown.
#[derive(Debug, Clone)]
pub struct MessageFormat {
    registry: Handlebars<'static>,
    has_startup: bool,
    has_change: bool,
}

#[derive(Serialize)]
struct TemplateData<'a> {
    current: &'a AddressValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<&'a AddressValue>,
    first_run: bool,
    timestamp: u64,
}

impl<'a> From<&'a ChangeEvent> for TemplateData<'a> {
    fn from(event: &'a ChangeEvent) -> Self {
        // Pre-epoch clocks render as 0
        let timestamp = event
            .detected_at
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());

        Self {
            current: &event.current,
            previous: event.previous.as_ref(),
            first_run: event.is_first_run(),
            timestamp,
        }
    }
}

impl Default for MessageFormat {
    fn default() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self {
            registry,
            has_startup: false,
            has_change: false,
        }
    }
}

impl MessageFormat {
    /// Creates a format from optional startup and change templates.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Compile`] if either template is invalid.
    pub fn new(startup: Option<&str>, change: Option<&str>) -> Result<Self, TemplateError> {
        let mut format = Self::default();

        if let Some(template) = startup {
            format.register(STARTUP, template)?;
            format.has_startup = true;
        }
        if let Some(template) = change {
            format.register(CHANGE, template)?;
            format.has_change = true;
        }

        Ok(format)
    }

    fn register(&mut self, name: &'static str, template: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(name, template)
            .map_err(|e| TemplateError::Compile {
                name,
                reason: e.to_string(),
            })
    }

    /// Returns true if any built-in message is overridden.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        self.has_startup || self.has_change
    }

    /// Renders the notification text for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if a custom template fails to render.
    pub fn render(&self, event: &ChangeEvent) -> Result<String, TemplateError> {
        let (name, custom) = if event.is_first_run() {
            (STARTUP, self.has_startup)
        } else {
            (CHANGE, self.has_change)
        };

        if !custom {
            return Ok(event.default_message());
        }

        self.registry
            .render(name, &TemplateData::from(event))
            .map_err(|e| TemplateError::Render {
                name,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn address(s: &str) -> AddressValue {
        AddressValue::parse(s).unwrap()
    }

    fn at() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_000_000)
    }

    #[test]
    fn default_format_uses_builtin_messages() {
        let format = MessageFormat::default();
        let event = ChangeEvent::first_run(address("1.2.3.4"), at());

        assert!(!format.is_custom());
        assert_eq!(format.render(&event).unwrap(), event.default_message());
    }

    #[test]
    fn startup_template_renders_current_and_timestamp() {
        let format = MessageFormat::new(Some("up at {{current}} ({{timestamp}})"), None).unwrap();
        let event = ChangeEvent::first_run(address("1.2.3.4"), at());

        assert_eq!(format.render(&event).unwrap(), "up at 1.2.3.4 (1000000)");
    }

    #[test]
    fn change_template_renders_both_addresses() {
        let format = MessageFormat::new(None, Some("{{previous}} -> {{current}}")).unwrap();
        let event = ChangeEvent::changed(address("1.2.3.4"), address("5.6.7.8"), at());

        assert_eq!(format.render(&event).unwrap(), "1.2.3.4 -> 5.6.7.8");
    }

    #[test]
    fn only_overridden_message_uses_template() {
        let format = MessageFormat::new(None, Some("changed to {{current}}")).unwrap();
        let event = ChangeEvent::first_run(address("1.2.3.4"), at());

        assert!(format.is_custom());
        assert_eq!(format.render(&event).unwrap(), event.default_message());
    }

    #[test]
    fn output_is_not_html_escaped() {
        let format = MessageFormat::new(None, Some("<{{previous}}> & <{{current}}>")).unwrap();
        let event = ChangeEvent::changed(address("a&b"), address("c<d"), at());

        assert_eq!(format.render(&event).unwrap(), "<a&b> & <c<d>");
    }

    #[test]
    fn first_run_flag_is_available() {
        let format =
            MessageFormat::new(Some("{{#if first_run}}fresh{{else}}old{{/if}}"), None).unwrap();
        let event = ChangeEvent::first_run(address("1.2.3.4"), at());

        assert_eq!(format.render(&event).unwrap(), "fresh");
    }

    #[test]
    fn invalid_template_is_rejected() {
        let result = MessageFormat::new(Some("{{#if current}}unterminated"), None);

        match result {
            Err(TemplateError::Compile { name, .. }) => assert_eq!(name, "startup"),
            other => panic!("Expected Compile error, got {other:?}"),
        }
    }
}
