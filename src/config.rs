use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REDIRECT_LIMIT, DEFAULT_TIMEOUT_SECS};

/// Transport options applied to every handle prepared by a request builder.
///
/// Missing fields fall back to the defaults, so a partial document such as
/// `{"timeout": 30}` deserializes into a complete set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Total transfer timeout in seconds, 0 for no limit.
    pub timeout: u64,
    /// Connection establishment timeout in seconds, 0 for no limit.
    pub connect_timeout: u64,
    /// Maximum number of redirects followed (0 disables following).
    pub max_redirects: usize,
    /// Verify TLS certificates and host names.
    pub verify_tls: bool,
    /// Ask for compressed bodies and decode them transparently.
    pub compression: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_redirects: DEFAULT_REDIRECT_LIMIT,
            verify_tls: false,
            compression: true,
        }
    }
}

impl Options {
    /// `None` when the transfer may run indefinitely.
    pub fn timeout(&self) -> Option<Duration> {
        secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        secs(self.connect_timeout)
    }
}

fn secs(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}
