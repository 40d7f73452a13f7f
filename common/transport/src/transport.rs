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

//! The platform session abstraction.
//!
//! A [`Transport`] owns the lifecycle of every task it creates. Callers only
//! observe tasks through the [`SessionDelegate`] installed with
//! [`Transport::set_delegate`].

use std::sync::Weak;

use session_utils::task_id::TaskId;

use crate::delegate::SessionDelegate;
use crate::error::HttpClientError;
use crate::request::Request;

/// A platform session able to run HTTP tasks.
///
/// Implementations must deliver the events of one task sequentially and
/// must end every task that was resumed with exactly one
/// [`SessionDelegate::on_complete`] call, including cancelled tasks.
pub trait Transport: Send + Sync {
    /// Installs the receiver of task events.
    ///
    /// Transports keep the delegate weakly; events for a dropped delegate are
    /// discarded.
    fn set_delegate(&self, delegate: Weak<dyn SessionDelegate>);

    /// Creates a task for `request` without starting it.
    fn create_task(&self, request: Request) -> Result<TaskId, HttpClientError>;

    /// Starts or resumes a task.
    fn resume(&self, task_id: TaskId);

    /// Suspends a running task.
    fn suspend(&self, task_id: TaskId);

    /// Asks the transport to cancel a task.
    ///
    /// Cancellation is asynchronous: the task later completes with a
    /// cancellation error through the delegate.
    fn cancel(&self, task_id: TaskId);
}
