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

//! Receiver of transport events.
//!
//! A transport calls into its [`SessionDelegate`] from its own worker threads.
//! Events for different tasks may arrive concurrently and in any order; the
//! events of one task are delivered one at a time and in order.

use session_utils::task_id::TaskId;

use crate::challenge::{AuthChallenge, ChallengeDisposition};
use crate::error::HttpClientError;
use crate::request::Request;
use crate::response::Response;

/// Whether the transport should keep receiving data for a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataDisposition {
    /// Keep going.
    Continue,
    /// Cancel the task; the transport completes it with a cancellation error.
    Cancel,
}

/// Trait defining callbacks for transport task events.
///
/// All methods have default implementations, so receivers only override
/// the events they are interested in.
#[allow(unused_variables)]
pub trait SessionDelegate: Send + Sync {
    /// Called when an authentication challenge arrives.
    ///
    /// `task_id` is `None` for connection-level challenges that are not tied
    /// to one task.
    fn on_challenge(
        &self,
        task_id: Option<TaskId>,
        challenge: &AuthChallenge,
    ) -> ChallengeDisposition {
        ChallengeDisposition::PerformDefaultHandling
    }

    /// Called once the status line and headers of a response arrived.
    fn on_response(&self, task_id: TaskId, response: &Response) {}

    /// Called for every chunk of response body, in arrival order.
    fn on_data(&self, task_id: TaskId, data: &[u8]) -> DataDisposition {
        DataDisposition::Continue
    }

    /// Called as the request body is sent.
    ///
    /// `total_sent` is the number of body bytes sent so far and `expected` the
    /// total body length when known.
    fn on_upload_progress(&self, task_id: TaskId, total_sent: u64, expected: Option<u64>) {}

    /// Called when the server answered with a redirect.
    ///
    /// Returns the request to follow, or `None` to stop and complete the task
    /// with the redirect response.
    fn on_redirect(&self, task_id: TaskId, response: &Response, request: Request) -> Option<Request> {
        Some(request)
    }

    /// Called exactly once when the task finished, with the error if it failed.
    fn on_complete(&self, task_id: TaskId, error: Option<HttpClientError>) {}
}
