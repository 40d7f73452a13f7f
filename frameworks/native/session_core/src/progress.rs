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

//! Upload and download progress.

use std::io::{self, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Transfer progress of one direction of a task.
///
/// `total` is `None` when the length is unknown, for example for chunked
/// responses. `completed` never decreases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Bytes transferred so far.
    pub completed: u64,
    /// Expected number of bytes, if known.
    pub total: Option<u64>,
}

impl Progress {
    /// Creates a progress value.
    pub const fn new(completed: u64, total: Option<u64>) -> Self {
        Self { completed, total }
    }

    /// Returns the completed fraction in `0.0..=1.0`, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.completed.min(total)) as f64 / total as f64),
            None => None,
        }
    }

    /// Returns `true` once every expected byte was transferred.
    pub fn is_complete(&self) -> bool {
        self.total.map(|t| self.completed >= t).unwrap_or(false)
    }

    /// Moves forward to `completed` out of `total`.
    ///
    /// A smaller `completed` is ignored and a known total is never replaced
    /// by an unknown one. Returns `true` if the value changed.
    pub(crate) fn advance(&mut self, completed: u64, total: Option<u64>) -> bool {
        let next = Progress {
            completed: self.completed.max(completed),
            total: total.or(self.total),
        };
        let changed = next != *self;
        *self = next;
        changed
    }
}

/// A reader that publishes how many bytes were read from it.
///
/// Wraps streamed upload bodies when the session tracks upload progress
/// itself instead of trusting the transport's counters.
pub(crate) struct CountingReader<R> {
    inner: R,
    position: Arc<AtomicU64>,
}

impl<R: Read> CountingReader<R> {
    pub(crate) fn new(inner: R) -> (Self, Arc<AtomicU64>) {
        let position = Arc::new(AtomicU64::new(0));
        let reader = Self {
            inner,
            position: position.clone(),
        };
        (reader, position)
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position.fetch_add(n as u64, Ordering::Release);
        Ok(n)
    }
}
