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

//! Task coordination and trust verification for an HTTP session.
//!
//! This crate sits between a caller issuing many concurrent HTTP tasks and a
//! platform transport that performs the network I/O. It keeps track of every
//! in-flight task, accumulates response data and progress, routes
//! authentication challenges and decides whether a server identity is
//! acceptable under a pinning policy.
//!
//! # Modules
//!
//! * [`session`] - The client-facing session and task handles
//! * [`registry`] - The registry of in-flight tasks
//! * [`delegate`] - Per-task records and outcomes
//! * [`progress`] - Progress values
//! * [`trust`] - Certificate pinning and system trust validation
//! * [`config`] - Serializable configuration
//! * [`error`] - Error types

#![warn(
    missing_docs,
    clippy::redundant_static_lifetimes,
    clippy::enum_variant_names,
    clippy::clone_on_copy
)]
#![deny(unused_must_use)]
#![allow(clippy::new_without_default, clippy::len_without_is_empty)]

pub mod config;
pub mod delegate;
mod dispatcher;
pub mod error;
pub mod progress;
pub mod registry;
pub mod session;
pub mod trust;


pub use config::{ServerTrustHandling, SessionConfig};
pub use delegate::{
    Payload, ProgressCallback, TaskInfo, TaskKind, TaskOutcome, TaskRecord, TaskState,
};
pub use dispatcher::{CredentialProvider, RedirectPolicy};
pub use error::{ErrorKind, SessionError};
pub use progress::Progress;
pub use registry::TaskRegistry;
pub use session::{completion_channel, CompletionSender, Session, SessionBuilder, TaskHandle};
