//! Reqcore configures HTTP requests, sends them one at a time or as a
//! concurrent batch, and turns what comes back into a [`Response`] with
//! case-insensitive headers and an optionally parsed XML body.
//!
//! ```no_run
//! # async fn run() -> reqcore::Result<()> {
//! let client = reqcore::Client::new();
//! let mut request = client.request("https://example.com/");
//! request.add_header("Accept", "application/xml");
//!
//! if let Some(response) = request.send(true).await?.into_response()
//!     && response.is_ok()
//! {
//!     println!("{:?}", response.header("content-type"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use config::Options;
pub use error::{Error, Result, TransportError, TransportErrorKind};
pub use http::{Client, Headers, Method, Outcome, Proxy, RequestBuilder, TransportHandle};
pub use response::{Body, DefaultResponseFactory, Response, ResponseFactory, ResponseParts};
pub use transport::{RawTransfer, ReqwestTransport, TransferInfo, Transport};
