// Copyright (C) 2024 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Module for constructing HTTP requests handed to a transport.
//!
//! This module provides a builder for [`Request`] values and the [`Body`]
//! variants a request can carry, including streamed bodies whose read position
//! can be observed for upload progress.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use url::Url;

use crate::error::{HttpClientError, HttpErrorCode};

/// Body of a request.
pub enum Body {
    /// No body.
    Empty,
    /// A body held in memory.
    Bytes(Vec<u8>),
    /// A body read from a stream by the transport.
    Stream {
        /// Source of the body bytes.
        reader: Box<dyn Read + Send>,
        /// Total length, when known in advance.
        length: Option<u64>,
    },
}

impl Body {
    /// Returns the body length if it is known before sending.
    pub fn len(&self) -> Option<u64> {
        match self {
            Body::Empty => Some(0),
            Body::Bytes(bytes) => Some(bytes.len() as u64),
            Body::Stream { length, .. } => *length,
        }
    }

    /// Returns `true` if the body is [`Body::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Body::Stream { length, .. } => write!(f, "Stream({:?})", length),
        }
    }
}

/// An HTTP request ready to be turned into a transport task.
///
/// # Examples
///
/// ```
/// use session_transport::request::Request;
///
/// let mut builder = Request::builder();
/// builder
///     .url("https://example.com/data")
///     .method("POST")
///     .header("Accept", "application/json")
///     .body(b"{}".to_vec());
/// let request = builder.build().unwrap();
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.host(), Some("example.com"));
/// ```
#[derive(Debug)]
pub struct Request {
    url: Url,
    method: String,
    headers: Vec<(String, String)>,
    body: Body,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl Request {
    /// Creates a new request builder with default settings.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Shorthand for a `GET` request without headers or body.
    pub fn get(url: &str) -> Result<Self, HttpClientError> {
        let mut builder = Self::builder();
        builder.url(url);
        builder.build()
    }

    /// Returns the target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Replaces the target URL, as redirect policies do.
    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    /// Returns the host of the target URL.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Returns the upper-case HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns all headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Returns the request body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Takes the body out of the request, leaving [`Body::Empty`].
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Replaces the request body.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// Returns the total timeout of the request.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the connection timeout of the request.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

/// Builder for [`Request`].
pub struct RequestBuilder {
    url: Option<String>,
    method: String,
    headers: Vec<(String, String)>,
    body: Body,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Creates a builder for a `GET` request without a URL.
    pub fn new() -> Self {
        Self {
            url: None,
            method: "GET".to_string(),
            headers: Vec::new(),
            body: Body::Empty,
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Sets the URL for the request.
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.url = Some(url.to_string());
        self
    }

    /// Sets the HTTP method for the request.
    pub fn method(&mut self, method: &str) -> &mut Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    /// Adds a header to the request.
    pub fn header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the request body as raw bytes.
    pub fn body(&mut self, body: Vec<u8>) -> &mut Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Sets a streamed request body.
    pub fn body_stream(&mut self, reader: Box<dyn Read + Send>, length: Option<u64>) -> &mut Self {
        self.body = Body::Stream { reader, length };
        self
    }

    /// Sets the total timeout for the entire request.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout for establishing the connection.
    pub fn connect_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Consumes the builder and creates the request.
    ///
    /// Fails with [`HttpErrorCode::HttpUrlMalformat`] when no URL was set or the
    /// URL cannot be parsed, and with [`HttpErrorCode::HttpUnsupportedProtocol`]
    /// for schemes other than `http` and `https`.
    pub fn build(self) -> Result<Request, HttpClientError> {
        let raw = self
            .url
            .ok_or_else(|| HttpClientError::new(HttpErrorCode::HttpUrlMalformat, "missing url"))?;
        let url = Url::parse(&raw).map_err(|e| {
            HttpClientError::new(HttpErrorCode::HttpUrlMalformat, format!("{}: {}", raw, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(HttpClientError::new(
                HttpErrorCode::HttpUnsupportedProtocol,
                format!("unsupported scheme {}", url.scheme()),
            ));
        }
        Ok(Request {
            url,
            method: self.method,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
