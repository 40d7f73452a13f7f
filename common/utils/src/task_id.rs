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

//! Task identifier utilities.
//!
//! Transports hand out a [`TaskId`] for every task they create. The value is
//! unique while the task is running and may be handed out again once the task
//! has completed.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque identifier for one in-flight network task.
///
/// # Examples
///
/// ```rust
/// use session_utils::task_id::TaskId;
///
/// let task_id = TaskId::new(42);
/// assert_eq!(task_id.value(), 42);
/// assert_eq!(task_id.to_string(), "42");
/// ```
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw identifier issued by a transport.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Generator for task identifiers.
///
/// Identifiers are issued from a monotonically increasing counter starting at
/// one, so a generator never repeats a value while it is alive. Transports that
/// recycle identifiers are free to use their own scheme.
///
/// # Examples
///
/// ```rust
/// use session_utils::task_id::TaskIdGenerator;
///
/// let generator = TaskIdGenerator::new();
/// let first = generator.generate();
/// let second = generator.generate();
/// assert_ne!(first, second);
/// ```
pub struct TaskIdGenerator {
    next: AtomicU64,
}

impl TaskIdGenerator {
    /// Creates a generator whose first identifier is `1`.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issues the next identifier.
    pub fn generate(&self) -> TaskId {
        TaskId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
