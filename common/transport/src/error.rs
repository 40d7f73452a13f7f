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

//! Error handling for transport operations.
//!
//! Transports report every task failure as an [`HttpClientError`] carrying an
//! [`HttpErrorCode`]. The code table follows the curl numbering used by the
//! platform network stack so that codes reported by native transports map
//! one-to-one.

use std::fmt;

/// Represents an error reported by the transport for one task.
///
/// Contains both an error code for programmatic handling and
/// a human-readable error message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpClientError {
    /// The specific error code categorizing this error
    code: HttpErrorCode,
    /// Human-readable description of the error
    msg: String,
}

impl HttpClientError {
    /// Creates a new `HttpClientError` with the given code and message.
    pub fn new(code: HttpErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }

    /// Creates the error a transport reports for a cancelled task.
    pub fn cancelled() -> Self {
        Self::new(HttpErrorCode::HttpTaskCanceled, "task cancelled")
    }

    /// Gets the error code for this error.
    pub fn code(&self) -> HttpErrorCode {
        self.code
    }

    /// Gets the human-readable error message.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Returns `true` if the task ended because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.code == HttpErrorCode::HttpTaskCanceled
    }
}

impl fmt::Display for HttpClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.msg, self.code as i32)
    }
}

impl std::error::Error for HttpClientError {}

/// Enumeration of possible transport error codes.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HttpErrorCode {
    /// No specific error occurred.
    HttpNoneErr,
    /// Permission denied when attempting to perform an operation (201).
    HttpPermissionDeniedCode = 201,
    /// Error parsing data (401).
    HttpParseErrorCode = 401,
    /// Base value for all HTTP error codes (2300000).
    HttpErrorCodeBase = 2300000,
    /// The requested protocol is not supported.
    HttpUnsupportedProtocol,
    /// Failed to initialize the HTTP client.
    HttpFailedInit,
    /// URL format is invalid or malformed.
    HttpUrlMalformat,
    /// Failed to resolve the proxy server hostname (2300005).
    HttpCouldntResolveProxy = 2300005,
    /// Failed to resolve the target host hostname.
    HttpCouldntResolveHost,
    /// Failed to establish a connection to the target host.
    HttpCouldntConnect,
    /// Received an unexpected or malformed response from the server.
    HttpWeirdServerReply,
    /// The server denied access to the requested resource.
    HttpRemoteAccessDenied,
    /// HTTP/2 framing layer error (2300016).
    HttpHttp2Error = 2300016,
    /// File transfer completed only partially (2300018).
    HttpPartialFile = 2300018,
    /// Error writing received data (2300023).
    HttpWriteError = 2300023,
    /// Upload failed (2300025).
    HttpUploadFailed = 2300025,
    /// Error reading the request body (2300026).
    HttpReadError = 2300026,
    /// Out of memory.
    HttpOutOfMemory,
    /// The operation timed out.
    HttpOperationTimedout,
    /// The task was cancelled (2300042).
    HttpTaskCanceled = 2300042,
    /// Too many redirects were followed (2300047).
    HttpTooManyRedirects = 2300047,
    /// The server returned nothing (2300052).
    HttpGotNothing = 2300052,
    /// Failed sending network data (2300055).
    HttpSendError = 2300055,
    /// Failed receiving network data, including a reset connection.
    HttpRecvError,
    /// Problem with the local client certificate (2300058).
    HttpSslCertproblem = 2300058,
    /// Could not use the specified cipher.
    HttpSslCipher,
    /// The peer certificate could not be authenticated.
    HttpPeerFailedVerification,
    /// Unrecognized transfer encoding.
    HttpBadContentEncoding,
    /// Problem reading the CA certificate file (2300077).
    HttpSslCacertBadfile = 2300077,
    /// The pinned public key did not match (2300090).
    HttpSslPinnedpubkeynotmatch = 2300090,
    /// Catch-all for unknown or uncategorized errors (2300999).
    #[default]
    HttpUnknownOtherError = 2300999,
}

/// Broad family an [`HttpErrorCode`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Name resolution failures.
    Dns,
    /// Connection establishment and socket I/O failures.
    Tcp,
    /// TLS handshake and certificate failures.
    Ssl,
    /// Malformed or unexpected protocol framing from the server.
    Protocol,
    /// The task was cancelled.
    Cancelled,
    /// Everything else, including timeouts.
    Others,
}

const DNS_ERROR_CODES: &[HttpErrorCode] = &[
    HttpErrorCode::HttpCouldntResolveProxy,
    HttpErrorCode::HttpCouldntResolveHost,
];

const TCP_ERROR_CODES: &[HttpErrorCode] = &[
    HttpErrorCode::HttpCouldntConnect,
    HttpErrorCode::HttpSendError,
    HttpErrorCode::HttpRecvError,
];

const SSL_ERROR_CODES: &[HttpErrorCode] = &[
    HttpErrorCode::HttpSslCertproblem,
    HttpErrorCode::HttpSslCipher,
    HttpErrorCode::HttpPeerFailedVerification,
    HttpErrorCode::HttpSslCacertBadfile,
    HttpErrorCode::HttpSslPinnedpubkeynotmatch,
];

const PROTOCOL_ERROR_CODES: &[HttpErrorCode] = &[
    HttpErrorCode::HttpWeirdServerReply,
    HttpErrorCode::HttpHttp2Error,
    HttpErrorCode::HttpPartialFile,
    HttpErrorCode::HttpGotNothing,
    HttpErrorCode::HttpBadContentEncoding,
    HttpErrorCode::HttpParseErrorCode,
];

impl HttpErrorCode {
    /// Classifies the code into its [`ErrorCategory`].
    pub fn category(&self) -> ErrorCategory {
        match self {
            code if DNS_ERROR_CODES.contains(code) => ErrorCategory::Dns,
            code if TCP_ERROR_CODES.contains(code) => ErrorCategory::Tcp,
            code if SSL_ERROR_CODES.contains(code) => ErrorCategory::Ssl,
            code if PROTOCOL_ERROR_CODES.contains(code) => ErrorCategory::Protocol,
            HttpErrorCode::HttpTaskCanceled => ErrorCategory::Cancelled,
            _ => ErrorCategory::Others,
        }
    }
}
