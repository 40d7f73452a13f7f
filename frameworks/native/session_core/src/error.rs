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

//! Error types reported by the session.
//!
//! Terminal task errors reach callers only through the completion callback.
//! [`SessionError::InvalidRequest`] is the exception: it is returned directly
//! from submission because no task exists yet.

use std::io;

use session_transport::{ErrorCategory, HttpClientError, HttpErrorCode};
use thiserror::Error;

use crate::trust::RejectReason;

/// Errors produced by the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server identity was rejected. Never retried.
    #[error("server trust evaluation failed for {host}{}", rejection(.reason))]
    TrustFailure {
        /// Host whose identity was rejected.
        host: String,
        /// Why the evaluator rejected the chain. `None` when the transport
        /// rejected it.
        reason: Option<RejectReason>,
    },

    /// Network level failure such as a timeout, a reset or a DNS error.
    #[error("transport error: {0}")]
    Transport(HttpClientError),

    /// Malformed framing or an unexpected reply from the server.
    #[error("protocol error: {0}")]
    Protocol(HttpClientError),

    /// The task was cancelled.
    #[error("task cancelled")]
    Cancelled,

    /// Writing the response to its local destination failed.
    #[error("local i/o error: {0}")]
    Io(#[from] io::Error),

    /// The transport refused to create the task.
    #[error("invalid request: {0}")]
    InvalidRequest(HttpClientError),

    /// A configuration value or pinning policy could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`SessionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Trust evaluation failures.
    Trust,
    /// Network level failures.
    Transport,
    /// Protocol and request shape failures.
    Protocol,
    /// Cancellation.
    Cancelled,
    /// Local file failures.
    Io,
    /// Configuration failures.
    Config,
}

impl SessionError {
    /// Classifies a terminal transport error for the task talking to `host`.
    pub fn from_transport(error: HttpClientError, host: &str) -> Self {
        match error.code().category() {
            ErrorCategory::Cancelled => SessionError::Cancelled,
            ErrorCategory::Ssl if rejects_peer(error.code()) => SessionError::TrustFailure {
                host: host.to_string(),
                reason: None,
            },
            ErrorCategory::Protocol => SessionError::Protocol(error),
            _ => SessionError::Transport(error),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::TrustFailure { .. } => ErrorKind::Trust,
            SessionError::Transport(_) => ErrorKind::Transport,
            SessionError::Protocol(_) | SessionError::InvalidRequest(_) => ErrorKind::Protocol,
            SessionError::Cancelled => ErrorKind::Cancelled,
            SessionError::Io(_) => ErrorKind::Io,
            SessionError::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns `true` if the error is [`SessionError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled)
    }
}

// Other SSL codes describe local setup or negotiation, not the peer.
fn rejects_peer(code: HttpErrorCode) -> bool {
    matches!(
        code,
        HttpErrorCode::HttpPeerFailedVerification | HttpErrorCode::HttpSslPinnedpubkeynotmatch
    )
}

fn rejection(reason: &Option<RejectReason>) -> String {
    reason.map(|r| format!(": {}", r)).unwrap_or_default()
}

impl From<toml::de::Error> for SessionError {
    fn from(e: toml::de::Error) -> Self {
        SessionError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(e: toml::ser::Error) -> Self {
        SessionError::Config(e.to_string())
    }
}
