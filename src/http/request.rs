use bytes::Bytes;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::config::Options;
use crate::constants::HTTP_VERSION_1_1;
use crate::error::{Error, Result};
use crate::http::client::Client;
use crate::http::headers::Headers;
use crate::http::method::Method;
use crate::http::proxy::Proxy;
use crate::response::ResponseFactory;
use crate::transport::Transport;

/// Username and password for HTTP authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    fn is_complete(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// A configured transfer that has not been executed yet.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    method: Method,
    url: Url,
    headers: Headers,
    body: Bytes,
    proxy: Option<Proxy>,
    credentials: Option<Credentials>,
    user_agent: String,
    options: Options,
}

impl TransportHandle {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers as they will be transmitted.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

/// Result of [`RequestBuilder::send`].
#[derive(Debug)]
pub enum Outcome<R> {
    /// The unparsed transfer: header block followed by body.
    Raw(Bytes),
    /// The response built by the client's factory.
    Parsed(R),
}

impl<R> Outcome<R> {
    pub fn into_response(self) -> Option<R> {
        match self {
            Outcome::Parsed(response) => Some(response),
            Outcome::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<Bytes> {
        match self {
            Outcome::Raw(raw) => Some(raw),
            Outcome::Parsed(_) => None,
        }
    }
}

/// Accumulates the configuration of a single request.
///
/// Setters only record values; the URL, headers and proxy are validated when
/// the request is prepared.
pub struct RequestBuilder<'a, T, F> {
    client: &'a Client<T, F>,
    url: String,
    method: Method,
    headers: Headers,
    body: Bytes,
    proxy: Option<Proxy>,
    credentials: Option<Credentials>,
    user_agent: String,
    options: Options,
}

impl<'a, T, F> RequestBuilder<'a, T, F>
where
    T: Transport,
    F: ResponseFactory,
{
    pub(crate) fn new(client: &'a Client<T, F>, url: String) -> Self {
        Self {
            client,
            url,
            method: Method::Get,
            headers: Headers::new(),
            body: Bytes::new(),
            proxy: None,
            credentials: None,
            user_agent: client.user_agent().to_string(),
            options: client.options().clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Set the method by name, in any letter case.
    pub fn set_method_str(&mut self, method: &str) -> Result<&mut Self> {
        self.method = method.parse()?;
        Ok(self)
    }

    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key, value);
        self
    }

    pub fn remove_header(&mut self, key: &str) -> &mut Self {
        self.headers.remove(key);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn set_credentials(&mut self, user: impl Into<String>, password: impl Into<String>) -> &mut Self {
        self.credentials = Some(Credentials::new(user, password));
        self
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn set_proxy(&mut self, proxy: Option<Proxy>) -> &mut Self {
        self.proxy = proxy;
        self
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Produce a transport handle for this request.
    ///
    /// `Expect: 100-continue` and `Connection: close` are always sent, and the
    /// request URL doubles as `Referer` unless one was set explicitly.
    /// Credentials are only used when both user and password are non-empty.
    pub fn prepare(&self) -> Result<TransportHandle> {
        let url = Url::parse(&self.url).map_err(|e| Error::InvalidUrl(format!("{}: {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                self.url,
                url.scheme()
            )));
        }

        let mut headers = self.headers.clone();
        headers.insert("Expect", "100-continue");
        headers.insert("Connection", "close");
        if !headers.contains("Referer") {
            headers.insert("Referer", url.as_str());
        }
        headers.to_header_map()?;

        debug!(method = %self.method, url = %url, "prepared request");

        Ok(TransportHandle {
            method: self.method,
            url,
            headers,
            body: self.body.clone(),
            proxy: self.proxy.clone(),
            credentials: self.credentials.clone().filter(Credentials::is_complete),
            user_agent: self.user_agent.clone(),
            options: self.options.clone(),
        })
    }

    /// Send the request and wait for the transfer to finish.
    ///
    /// The transfer is always parsed, so malformed output is reported either
    /// way; `parse` only selects what is handed back.
    pub async fn send(self, parse: bool) -> Result<Outcome<F::Response>> {
        let handle = self.prepare()?;
        let transfer = self.client.execute(handle).await?;
        let response = self.client.process(&transfer)?;

        if parse {
            Ok(Outcome::Parsed(response))
        } else {
            Ok(Outcome::Raw(transfer.into_raw()))
        }
    }
}

/// Format a prepared handle as a raw HTTP request for display
pub fn format_raw_request(handle: &TransportHandle) -> String {
    let url = handle.url();
    let path_and_query = if let Some(query) = url.query() {
        format!("{}?{}", url.path(), query)
    } else {
        url.path().to_string()
    };
    let mut raw_req = format!("{} {} {}\n", handle.method(), path_and_query, HTTP_VERSION_1_1);
    raw_req.push_str(&format!("Host: {}\n", url.host_str().unwrap_or("")));
    raw_req.push_str(&format!("User-Agent: {}\n", handle.user_agent()));

    for (name, value) in handle.headers() {
        raw_req.push_str(&format!("{}: {}\n", name, value));
    }

    if handle.method().sends_body() && !handle.body().is_empty() {
        raw_req.push_str(&format!("\n{}", String::from_utf8_lossy(handle.body())));
    }

    raw_req
}
