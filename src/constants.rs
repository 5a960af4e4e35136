/// HTTP constants
pub const DEFAULT_REDIRECT_LIMIT: usize = 5;
pub const HTTP_VERSION_1_1: &str = "HTTP/1.1";
pub const DEFAULT_USER_AGENT: &str = concat!("reqcore/", env!("CARGO_PKG_VERSION"));

/// Transport timeouts in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5_184_000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 120;

/// Status codes accepted by `Response::is_ok`
pub const DEFAULT_OK_CODES: [u16; 3] = [200, 201, 204];

/// Marker that switches a response body to XML parsing
pub const XML_DECLARATION: &[u8] = b"<?xml";

/// Header block framing
pub const CRLF: &str = "\r\n";
pub const STATUS_LINE_PREFIX: &str = "HTTP/";
