pub mod client;
pub mod headers;
pub mod method;
pub mod parse;
pub mod proxy;
pub mod request;

pub use client::Client;
pub use headers::{Headers, parse_headers};
pub use method::Method;
pub use parse::{parse_header_block, parse_request_line, split_transfer};
pub use proxy::Proxy;
pub use request::{Credentials, Outcome, RequestBuilder, TransportHandle, format_raw_request};
