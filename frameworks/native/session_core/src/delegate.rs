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

//! Per-task state kept by the registry while a task is in flight.
//!
//! A [`TaskRecord`] accumulates the response, the body and the progress of
//! one task and owns its callbacks. The transport serializes the events of a
//! task, so the record's mutex is uncontended; it is released before any
//! user callback runs.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use session_transport::{DataDisposition, HttpClientError, Response};
use session_utils::task_id::TaskId;
use session_utils::{debug, error, info};
use url::Url;

use crate::error::SessionError;
use crate::progress::Progress;
use crate::trust::RejectReason;

pub(crate) const INIT: usize = 0;
pub(crate) const RUNNING: usize = 1;
pub(crate) const SUCCESS: usize = 2;
pub(crate) const FAIL: usize = 3;
pub(crate) const CANCEL: usize = 4;
pub(crate) const SUSPEND: usize = 5;

/// Callback receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

pub(crate) type CompletionCallback = Box<dyn FnOnce(TaskOutcome) + Send>;

/// Lifecycle state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Created, not started yet.
    Init,
    /// Started.
    Running,
    /// Suspended by the caller.
    Suspended,
    /// Completed without error.
    Success,
    /// Completed with an error.
    Failed,
    /// Completed after cancellation.
    Cancelled,
}

impl From<usize> for TaskState {
    fn from(state: usize) -> Self {
        match state {
            RUNNING => TaskState::Running,
            SUSPEND => TaskState::Suspended,
            SUCCESS => TaskState::Success,
            FAIL => TaskState::Failed,
            CANCEL => TaskState::Cancelled,
            _ => TaskState::Init,
        }
    }
}

/// What a task does with its body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Request with the response body collected in memory.
    Data,
    /// Request whose progress of interest is the request body.
    Upload,
    /// Request with the response body written to a file.
    Download,
}

/// Immutable description of a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskInfo {
    task_id: TaskId,
    kind: TaskKind,
    method: String,
    url: Url,
}

impl TaskInfo {
    /// Creates a task description.
    pub fn new(task_id: TaskId, kind: TaskKind, method: &str, url: Url) -> Self {
        Self {
            task_id,
            kind,
            method: method.to_string(),
            url,
        }
    }

    /// Transport identifier of the task.
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Kind of the task.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// HTTP method of the original request.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// URL of the original request.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host of the original request, or an empty string.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

/// Body delivered with a [`TaskOutcome`].
#[derive(Debug, PartialEq, Eq)]
pub enum Payload {
    /// Body collected in memory.
    Bytes(Vec<u8>),
    /// Body written to this file.
    File(PathBuf),
}

/// Final result of a task, delivered exactly once.
///
/// Data received before a failure is kept in `payload`.
#[derive(Debug)]
pub struct TaskOutcome {
    /// Task the outcome belongs to.
    pub task_id: TaskId,
    /// Last response received, if any.
    pub response: Option<Response>,
    /// Received body.
    pub payload: Payload,
    /// Error the task ended with.
    pub error: Option<SessionError>,
}

impl TaskOutcome {
    /// Returns `true` if the task ended without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the in-memory body, if the task collected one.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes(bytes) => Some(bytes),
            Payload::File(_) => None,
        }
    }
}

pub(crate) enum DataSink {
    Memory(Vec<u8>),
    File { path: PathBuf, writer: BufWriter<File> },
}

impl DataSink {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            DataSink::Memory(buf) => {
                buf.extend_from_slice(data);
                Ok(())
            }
            DataSink::File { writer, .. } => writer.write_all(data),
        }
    }

    fn finalize(&mut self) -> (Payload, io::Result<()>) {
        match self {
            DataSink::Memory(buf) => (Payload::Bytes(std::mem::take(buf)), Ok(())),
            DataSink::File { path, writer } => (Payload::File(path.clone()), writer.flush()),
        }
    }
}

/// Mutable part of a [`TaskRecord`].
pub(crate) struct TaskDelegate {
    upload_progress: Progress,
    download_progress: Progress,
    sink: DataSink,
    received: u64,
    expected_length: Option<u64>,
    response: Option<Response>,
    completion: Option<CompletionCallback>,
    upload_callback: Option<ProgressCallback>,
    download_callback: Option<ProgressCallback>,
    upload_counter: Option<(Arc<AtomicU64>, Option<u64>)>,
    trust_rejected: Option<RejectReason>,
    io_error: Option<io::Error>,
}

impl TaskDelegate {
    pub(crate) fn new(completion: CompletionCallback) -> Self {
        Self {
            upload_progress: Progress::default(),
            download_progress: Progress::default(),
            sink: DataSink::Memory(Vec::new()),
            received: 0,
            expected_length: None,
            response: None,
            completion: Some(completion),
            upload_callback: None,
            download_callback: None,
            upload_counter: None,
            trust_rejected: None,
            io_error: None,
        }
    }

    pub(crate) fn file_sink(mut self, path: PathBuf, file: File) -> Self {
        self.sink = DataSink::File {
            path,
            writer: BufWriter::new(file),
        };
        self
    }

    pub(crate) fn download_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.download_callback = callback;
        self
    }

    pub(crate) fn upload_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.upload_callback = callback;
        self
    }

    /// Drives upload progress from a counting reader instead of the
    /// transport's counters.
    pub(crate) fn upload_counter(mut self, position: Arc<AtomicU64>, length: Option<u64>) -> Self {
        self.upload_counter = Some((position, length));
        self
    }

    pub(crate) fn upload_progress(&self) -> Progress {
        self.upload_progress
    }

    pub(crate) fn download_progress(&self) -> Progress {
        self.download_progress
    }
}

/// Registry entry of one in-flight task.
pub struct TaskRecord {
    info: TaskInfo,
    delegate: Mutex<TaskDelegate>,
    finish: Arc<AtomicBool>,
    state: Arc<AtomicUsize>,
}

impl TaskRecord {
    /// Creates a record collecting the body in memory.
    pub fn new<F>(info: TaskInfo, completion: F) -> Self
    where
        F: FnOnce(TaskOutcome) + Send + 'static,
    {
        Self::with_delegate(info, TaskDelegate::new(Box::new(completion)))
    }

    pub(crate) fn with_delegate(info: TaskInfo, delegate: TaskDelegate) -> Self {
        Self {
            info,
            delegate: Mutex::new(delegate),
            finish: Arc::new(AtomicBool::new(false)),
            state: Arc::new(AtomicUsize::new(INIT)),
        }
    }

    /// Immutable description of the task.
    pub fn info(&self) -> &TaskInfo {
        &self.info
    }

    /// Returns `true` once the completion callback was dispatched.
    pub fn is_finished(&self) -> bool {
        self.finish.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        TaskState::from(self.state.load(Ordering::Acquire))
    }

    /// Current upload progress.
    pub fn upload_progress(&self) -> Progress {
        self.delegate().upload_progress()
    }

    /// Current download progress.
    pub fn download_progress(&self) -> Progress {
        self.delegate().download_progress()
    }

    pub(crate) fn flags(&self) -> (Arc<AtomicBool>, Arc<AtomicUsize>) {
        (self.finish.clone(), self.state.clone())
    }

    pub(crate) fn set_running(&self) {
        let _ = self
            .state
            .compare_exchange(INIT, RUNNING, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn delegate(&self) -> MutexGuard<'_, TaskDelegate> {
        self.delegate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn receive_response(&self, response: &Response) {
        let mut delegate = self.delegate();
        delegate.expected_length = response.content_length();
        delegate.response = Some(response.clone());
        debug!(
            "{} response {} expected {:?}",
            self.info.task_id,
            response.status(),
            delegate.expected_length
        );
    }

    /// Appends a chunk of body in arrival order.
    ///
    /// Returns [`DataDisposition::Cancel`] once writing to the sink failed.
    pub(crate) fn receive_data(&self, data: &[u8]) -> DataDisposition {
        let mut delegate = self.delegate();
        if delegate.io_error.is_some() {
            return DataDisposition::Cancel;
        }
        if let Err(e) = delegate.sink.write(data) {
            error!("{} write response body failed: {}", self.info.task_id, e);
            delegate.io_error = Some(e);
            return DataDisposition::Cancel;
        }
        delegate.received += data.len() as u64;
        let (received, expected) = (delegate.received, delegate.expected_length);
        let changed = delegate.download_progress.advance(received, expected);
        let notify = delegate
            .download_callback
            .clone()
            .filter(|_| changed)
            .map(|callback| (callback, delegate.download_progress));
        drop(delegate);

        if let Some((callback, progress)) = notify {
            callback(progress);
        }
        DataDisposition::Continue
    }

    pub(crate) fn send_progress(&self, total_sent: u64, expected: Option<u64>) {
        let mut delegate = self.delegate();
        let (sent, expected) = match delegate.upload_counter.as_ref() {
            Some((position, length)) => (position.load(Ordering::Acquire), length.or(expected)),
            None => (total_sent, expected),
        };
        let changed = delegate.upload_progress.advance(sent, expected);
        let notify = delegate
            .upload_callback
            .clone()
            .filter(|_| changed)
            .map(|callback| (callback, delegate.upload_progress));
        drop(delegate);

        if let Some((callback, progress)) = notify {
            callback(progress);
        }
    }

    pub(crate) fn reject_trust(&self, reason: RejectReason) {
        self.delegate().trust_rejected = Some(reason);
    }

    /// Finalizes the task and invokes its completion callback.
    ///
    /// Must be called at most once, after the record left the registry.
    pub(crate) fn complete(&self, error: Option<HttpClientError>) {
        let mut delegate = self.delegate();
        let (payload, flushed) = delegate.sink.finalize();
        if let Err(e) = flushed {
            error!("{} flush response body failed: {}", self.info.task_id, e);
            delegate.io_error.get_or_insert(e);
        }

        let host = self.info.host();
        let error = if let Some(e) = delegate.io_error.take() {
            Some(SessionError::Io(e))
        } else if let (Some(reason), Some(_)) = (delegate.trust_rejected, error.as_ref()) {
            Some(SessionError::TrustFailure {
                host: host.to_string(),
                reason: Some(reason),
            })
        } else {
            error.map(|e| SessionError::from_transport(e, host))
        };

        let completion = delegate.completion.take();
        let outcome = TaskOutcome {
            task_id: self.info.task_id,
            response: delegate.response.take(),
            payload,
            error,
        };
        drop(delegate);

        let state = match outcome.error.as_ref() {
            None => SUCCESS,
            Some(e) if e.is_cancelled() => CANCEL,
            Some(_) => FAIL,
        };
        self.state.store(state, Ordering::Release);
        self.finish.store(true, Ordering::Release);

        match outcome.error.as_ref() {
            None => info!("{} completed", self.info.task_id),
            Some(e) => info!("{} completed with error: {}", self.info.task_id, e),
        }
        if let Some(completion) = completion {
            completion(outcome);
        }
    }
}
