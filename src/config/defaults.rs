//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default polling interval in seconds.
pub const POLL_INTERVAL_SECS: u64 = 300;

/// Default bound on a single address lookup, in seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Default public-IP lookup service (plain-text response).
pub const IP_SERVICE_URL: &str = "https://api.ipify.org?format=text";

/// Default chat API base URL.
pub const API_BASE: &str = crate::notify::DEFAULT_API_BASE;

/// Default state file path, relative to the working directory.
pub const STATE_FILE: &str = "last_ip.txt";

