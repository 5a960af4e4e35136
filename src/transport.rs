//! The seam between request building and the network engine.
//!
//! A [`Transport`] turns a prepared [`TransportHandle`] into a [`RawTransfer`]:
//! the header block and body exactly as received, plus the number of bytes
//! the header block occupies and some diagnostics about the transfer. The
//! default implementation drives `reqwest`; tests and callers with special
//! needs can supply their own.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use digest_auth::{AuthContext, HttpMethod};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Client, RequestBuilder, Response, StatusCode, redirect::Policy};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::constants::CRLF;
use crate::error::{TransportError, TransportErrorKind};
use crate::http::{Method, TransportHandle};

/// Executes prepared handles.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, handle: TransportHandle) -> Result<RawTransfer, TransportError>;
}

/// Diagnostics reported alongside a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferInfo {
    /// Effective URL after redirects.
    pub url: String,
    pub http_code: u16,
    pub http_version: String,
    pub remote_addr: Option<SocketAddr>,
    #[serde(rename = "total_time_ms", serialize_with = "serialize_millis")]
    pub total_time: Duration,
    pub header_size: usize,
    pub size_download: u64,
    pub content_type: Option<String>,
    pub max_redirects: usize,
    /// The method of the request that produced this transfer.
    pub method: Method,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl TransferInfo {
    pub fn new(url: impl Into<String>, method: Method, http_code: u16) -> Self {
        Self {
            url: url.into(),
            http_code,
            http_version: crate::constants::HTTP_VERSION_1_1.to_string(),
            remote_addr: None,
            total_time: Duration::ZERO,
            header_size: 0,
            size_download: 0,
            content_type: None,
            max_redirects: 0,
            method,
        }
    }
}

/// Unparsed output of one transfer: header block followed by body.
#[derive(Debug, Clone)]
pub struct RawTransfer {
    raw: Bytes,
    header_size: usize,
    info: TransferInfo,
}

impl RawTransfer {
    pub fn new(raw: impl Into<Bytes>, header_size: usize, info: TransferInfo) -> Self {
        Self {
            raw: raw.into(),
            header_size,
            info,
        }
    }

    /// Build a transfer from a separate header block and body.
    pub fn from_parts(header_block: &str, body: &[u8], mut info: TransferInfo) -> Self {
        let mut raw = BytesMut::with_capacity(header_block.len() + body.len());
        raw.extend_from_slice(header_block.as_bytes());
        raw.extend_from_slice(body);
        info.header_size = header_block.len();
        info.size_download = body.len() as u64;
        Self {
            raw: raw.freeze(),
            header_size: header_block.len(),
            info,
        }
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn info(&self) -> &TransferInfo {
        &self.info
    }

    pub fn into_raw(self) -> Bytes {
        self.raw
    }
}

/// Default transport backed by `reqwest`.
///
/// Every handle gets its own client, so no connection outlives its transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

/// Build HTTP client from the options carried by a handle
pub fn build_http_client(handle: &TransportHandle) -> Result<Client, TransportError> {
    let options = handle.options();
    let redirect_policy = if options.max_redirects > 0 {
        Policy::limited(options.max_redirects)
    } else {
        Policy::none()
    };

    let mut client_builder = Client::builder()
        .redirect(redirect_policy)
        .user_agent(handle.user_agent())
        .http1_only();

    if let Some(timeout) = options.timeout() {
        client_builder = client_builder.timeout(timeout);
    }
    if let Some(connect_timeout) = options.connect_timeout() {
        client_builder = client_builder.connect_timeout(connect_timeout);
    }

    if !options.verify_tls {
        client_builder = client_builder.danger_accept_invalid_certs(true);
    }

    if !options.compression {
        client_builder = client_builder.no_gzip().no_deflate();
    }

    if let Some(proxy) = handle.proxy() {
        client_builder = client_builder.proxy(proxy.to_transport()?);
    }

    Ok(client_builder.build()?)
}

fn build_request(
    client: &Client,
    handle: &TransportHandle,
    headers: HeaderMap,
    digest: Option<String>,
) -> RequestBuilder {
    let mut request = client
        .request(handle.method().into(), handle.url().clone())
        .headers(headers);

    match (digest, handle.credentials()) {
        (Some(authorization), _) => request = request.header(AUTHORIZATION, authorization),
        (None, Some(credentials)) => {
            request = request.basic_auth(credentials.user(), Some(credentials.password()));
        }
        (None, None) => {}
    }

    if handle.method().sends_body() {
        request = request.body(handle.body().clone());
    }
    request
}

/// `Authorization` value answering a `Digest` challenge carried by `resp`.
///
/// `None` when the handle has no credentials, the server offered no digest
/// scheme, or the challenge could not be answered.
fn digest_authorization(handle: &TransportHandle, resp: &Response) -> Option<String> {
    let credentials = handle.credentials()?;
    let challenge = resp
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| {
            v.trim_start()
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })?;

    let url = handle.url();
    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let body = handle
        .method()
        .sends_body()
        .then(|| &handle.body()[..]);
    let context = AuthContext::new_with_method(
        credentials.user(),
        credentials.password(),
        uri,
        body,
        HttpMethod::from(handle.method().as_str()),
    );

    let answer = digest_auth::parse(challenge).and_then(|mut prompt| prompt.respond(&context));
    match answer {
        Ok(authorization) => Some(authorization.to_header_string()),
        Err(e) => {
            warn!(url = %url, error = %e, "cannot answer digest challenge");
            None
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, handle: TransportHandle) -> Result<RawTransfer, TransportError> {
        let client = build_http_client(&handle)?;
        let header_map = handle
            .headers()
            .to_header_map()
            .map_err(|e| TransportError::new(TransportErrorKind::Request, e.to_string()))?;

        let start_time = Instant::now();
        let mut resp = build_request(&client, &handle, header_map.clone(), None).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED
            && let Some(authorization) = digest_authorization(&handle, &resp)
        {
            debug!(url = %handle.url(), "answering digest challenge");
            resp = build_request(&client, &handle, header_map, Some(authorization))
                .send()
                .await?;
        }

        let status = resp.status();
        let mut header_block = format!("{:?} {}{CRLF}", resp.version(), status);
        for (name, value) in resp.headers() {
            header_block.push_str(&format!(
                "{}: {}{CRLF}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            ));
        }
        header_block.push_str(CRLF);

        let mut info = TransferInfo {
            url: resp.url().to_string(),
            http_code: status.as_u16(),
            http_version: format!("{:?}", resp.version()),
            remote_addr: resp.remote_addr(),
            total_time: Duration::ZERO,
            header_size: 0,
            size_download: 0,
            content_type: resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            max_redirects: handle.options().max_redirects,
            method: handle.method(),
        };

        let body = resp.bytes().await?;
        info.total_time = start_time.elapsed();

        debug!(
            method = %handle.method(),
            url = %info.url,
            status = info.http_code,
            bytes = body.len(),
            elapsed = ?info.total_time,
            "transfer complete"
        );

        Ok(RawTransfer::from_parts(&header_block, &body, info))
    }
}
