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

//! Module for handling HTTP response metadata.
//!
//! A transport reports the status line and headers of every response before
//! the body arrives. Bodies are delivered separately as data events.

use std::collections::HashMap;

use url::Url;

/// Response metadata reported by the transport.
///
/// Header names are stored lowercase for case-insensitive access.
///
/// # Examples
///
/// ```
/// use session_transport::response::Response;
/// use url::Url;
///
/// let url = Url::parse("https://example.com").unwrap();
/// let response = Response::new(url, 200, [("Content-Length", "450")]);
/// assert_eq!(response.content_length(), Some(450));
/// assert_eq!(response.header("content-length"), Some("450"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    url: Url,
    status: u16,
    headers: HashMap<String, String>,
}

impl Response {
    /// Creates a response from its URL, status code and headers.
    pub fn new<I, K, V>(url: Url, status: u16, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_lowercase(), value.into()))
            .collect();
        Self {
            url,
            status,
            headers,
        }
    }

    /// Gets the HTTP status code of the response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns `true` for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gets the URL the response was received from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Gets all response headers keyed by lowercase name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Gets a header value by name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Returns the declared body length.
    ///
    /// Chunked responses have no usable length hint even when a
    /// `content-length` header is present.
    pub fn content_length(&self) -> Option<u64> {
        let is_chunked = self
            .header("transfer-encoding")
            .map(|s| s.eq_ignore_ascii_case("chunked"))
            .unwrap_or(false);
        if is_chunked {
            None
        } else {
            self.header("content-length")
                .and_then(|s| s.trim().parse::<u64>().ok())
        }
    }
}
