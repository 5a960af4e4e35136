//! Parsed responses and the factory seam used to build them.

use bytes::Bytes;
use std::borrow::Cow;
use xmltree::Element;

use crate::constants::{DEFAULT_OK_CODES, XML_DECLARATION};
use crate::error::Result;
use crate::http::Headers;
use crate::transport::TransferInfo;

/// Everything a factory needs to build a response.
#[derive(Debug, Clone)]
pub struct ResponseParts {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: Headers,
    pub body: Bytes,
    pub info: TransferInfo,
}

/// Builds the response value a [`Client`](crate::Client) hands back.
///
/// Closures taking [`ResponseParts`] implement this trait, so a caller that
/// wants its own response type does not need a named factory.
pub trait ResponseFactory: Send + Sync {
    type Response: Send;

    fn create(&self, parts: ResponseParts) -> Result<Self::Response>;
}

impl<F, R> ResponseFactory for F
where
    F: Fn(ResponseParts) -> Result<R> + Send + Sync,
    R: Send,
{
    type Response = R;

    fn create(&self, parts: ResponseParts) -> Result<R> {
        self(parts)
    }
}

/// Produces [`Response`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseFactory;

impl ResponseFactory for DefaultResponseFactory {
    type Response = Response;

    fn create(&self, parts: ResponseParts) -> Result<Response> {
        Response::from_parts(parts)
    }
}

/// Response body, parsed when it is an XML document.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Raw(Bytes),
    Xml(Element),
}

impl Body {
    /// Parse `bytes` as XML if, ignoring leading whitespace, it starts with an
    /// XML declaration; keep it verbatim otherwise.
    pub fn parse(bytes: Bytes) -> Result<Self> {
        let trimmed = bytes.trim_ascii_start();
        if trimmed.starts_with(XML_DECLARATION) {
            return Ok(Body::Xml(Element::parse(trimmed)?));
        }
        Ok(Body::Raw(bytes))
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Raw(bytes) => Some(bytes),
            Body::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&Element> {
        match self {
            Body::Xml(element) => Some(element),
            Body::Raw(_) => None,
        }
    }

    pub fn is_xml(&self) -> bool {
        matches!(self, Body::Xml(_))
    }

    /// Raw bodies as (lossy) UTF-8 text.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(|b| String::from_utf8_lossy(b))
    }
}

/// A completed HTTP transaction.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Body,
    info: Option<TransferInfo>,
}

impl Response {
    /// Build a response directly from its parts.
    ///
    /// Header names are stored as given and looked up case-insensitively.
    pub fn new(headers: Headers, body: impl Into<Bytes>, status: u16) -> Result<Self> {
        Ok(Self {
            status,
            headers,
            body: Body::parse(body.into())?,
            info: None,
        })
    }

    pub fn from_parts(parts: ResponseParts) -> Result<Self> {
        let mut response = Self::new(parts.headers, parts.body, parts.status)?;
        response.info = Some(parts.info);
        Ok(response)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header value, `None` when the response did not carry it.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    /// Transfer diagnostics; absent for responses built with [`Response::new`].
    pub fn info(&self) -> Option<&TransferInfo> {
        self.info.as_ref()
    }

    /// Whether the status is one of 200, 201 or 204.
    pub fn is_ok(&self) -> bool {
        self.is_ok_with(&DEFAULT_OK_CODES)
    }

    /// Whether the status is one of `codes`.
    pub fn is_ok_with(&self, codes: &[u16]) -> bool {
        codes.contains(&self.status)
    }
}
