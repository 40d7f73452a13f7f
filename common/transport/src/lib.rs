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

//! Rust interface to a platform HTTP session.
//!
//! This crate describes the contract between the session core and the
//! platform transport that actually performs network I/O: the requests it
//! accepts, the events it delivers and the errors it reports.
//!
//! # Modules
//!
//! * [`request`] - Types and functionality for creating HTTP requests
//! * [`response`] - Response metadata reported by the transport
//! * [`challenge`] - Authentication challenges and their answers
//! * [`delegate`] - The receiver of transport events
//! * [`transport`] - The transport trait itself
//! * [`error`] - Error types and handling

#![warn(
    missing_docs,
    clippy::redundant_static_lifetimes,
    clippy::enum_variant_names,
    clippy::clone_on_copy
)]
#![deny(unused_must_use)]
#![allow(clippy::new_without_default, clippy::len_without_is_empty)]

pub mod challenge;
pub mod delegate;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use challenge::{AuthChallenge, AuthMethod, ChallengeDisposition, Credential};
pub use delegate::{DataDisposition, SessionDelegate};
pub use error::{ErrorCategory, HttpClientError, HttpErrorCode};
pub use request::{Body, Request, RequestBuilder};
pub use response::Response;
pub use transport::Transport;
