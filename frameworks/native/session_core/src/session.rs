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

//! The client-facing session.
//!
//! A [`Session`] owns a task registry, the current pinning policy and the
//! dispatcher that receives events from the transport. Requests are turned
//! into transport tasks by [`Session::submit`] and friends; results come back
//! through the completion callback given at submission.

use std::fmt;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, PoisonError, RwLock};

use session_transport::{Body, HttpClientError, HttpErrorCode, Request, SessionDelegate, Transport};
use session_utils::task_id::TaskId;
use session_utils::{error, info};

use crate::config::{ServerTrustHandling, SessionConfig};
use crate::delegate::{
    ProgressCallback, TaskDelegate, TaskInfo, TaskKind, TaskOutcome, TaskRecord, TaskState,
    RUNNING, SUSPEND,
};
use crate::dispatcher::{current_policy, CredentialProvider, PolicySlot, RedirectPolicy, SessionDispatcher};
use crate::error::SessionError;
use crate::progress::CountingReader;
use crate::registry::TaskRegistry;
use crate::trust::{Certificate, PinningPolicy, SystemTrust, TrustEvaluator, WebPkiSystemTrust};

/// Client object issuing HTTP tasks through a [`Transport`].
///
/// The transport keeps only a weak reference to the session's event
/// receiver: events arriving after the session was dropped are discarded.
/// Dropping the session invalidates it: every task still in flight is
/// cancelled and completes with [`SessionError::Cancelled`].
pub struct Session {
    transport: Arc<dyn Transport>,
    registry: Arc<TaskRegistry>,
    policy: PolicySlot,
    // Keeps the transport's weak delegate alive.
    _dispatcher: Arc<SessionDispatcher>,
    manual_upload_progress: bool,
}

impl Session {
    /// Creates a builder for a session running on `transport`.
    pub fn builder(transport: Arc<dyn Transport>) -> SessionBuilder {
        SessionBuilder::new(transport)
    }

    /// Creates a session from a configuration.
    pub fn new(transport: Arc<dyn Transport>, config: &SessionConfig) -> Result<Self, SessionError> {
        let mut builder = Self::builder(transport);
        builder
            .policy(PinningPolicy::from_config(&config.policy)?)
            .server_trust_handling(config.server_trust_handling)
            .manual_upload_progress(config.manual_upload_progress);
        if let Some(dir) = config.trust_anchor_dir.as_ref() {
            let anchors = Certificate::load_dir(dir)?;
            builder.system_trust(Arc::new(WebPkiSystemTrust::default().with_anchors(&anchors)));
        }
        Ok(builder.build())
    }

    /// Submits a request whose response body is collected in memory.
    ///
    /// `progress` receives download progress. Fails with
    /// [`SessionError::InvalidRequest`] when the transport refuses the
    /// request; every other failure is reported through `completion`.
    pub fn submit<F>(
        &self,
        request: Request,
        completion: F,
        progress: Option<ProgressCallback>,
    ) -> Result<TaskHandle, SessionError>
    where
        F: FnOnce(TaskOutcome) + Send + 'static,
    {
        let delegate = TaskDelegate::new(Box::new(completion)).download_callback(progress);
        self.start(request, TaskKind::Data, delegate)
    }

    /// Submits a request whose progress of interest is the request body.
    pub fn upload<F>(
        &self,
        request: Request,
        completion: F,
        upload_progress: Option<ProgressCallback>,
    ) -> Result<TaskHandle, SessionError>
    where
        F: FnOnce(TaskOutcome) + Send + 'static,
    {
        let delegate = TaskDelegate::new(Box::new(completion)).upload_callback(upload_progress);
        self.start(request, TaskKind::Upload, delegate)
    }

    /// Submits a request whose response body is written to `destination`.
    ///
    /// The file is created, or truncated, before the task starts.
    pub fn download<F>(
        &self,
        request: Request,
        destination: impl Into<PathBuf>,
        completion: F,
        progress: Option<ProgressCallback>,
    ) -> Result<TaskHandle, SessionError>
    where
        F: FnOnce(TaskOutcome) + Send + 'static,
    {
        let path = destination.into();
        let file = File::create(&path)?;
        let delegate = TaskDelegate::new(Box::new(completion))
            .file_sink(path.clone(), file)
            .download_callback(progress);
        self.start(request, TaskKind::Download, delegate)
            .map_err(|e| {
                let _ = fs::remove_file(&path);
                e
            })
    }

    fn start(
        &self,
        mut request: Request,
        kind: TaskKind,
        mut delegate: TaskDelegate,
    ) -> Result<TaskHandle, SessionError> {
        if self.manual_upload_progress {
            let body = match request.take_body() {
                Body::Stream { reader, length } => {
                    let (reader, position) = CountingReader::new(reader);
                    delegate = delegate.upload_counter(position, length);
                    Body::Stream {
                        reader: Box::new(reader),
                        length,
                    }
                }
                other => other,
            };
            request.set_body(body);
        }

        let method = request.method().to_string();
        let url = request.url().clone();
        let task_id = self.transport.create_task(request).map_err(|e| {
            error!("create task for {} failed: {}", url, e);
            SessionError::InvalidRequest(e)
        })?;

        let info = TaskInfo::new(task_id, kind, &method, url);
        let record = Arc::new(TaskRecord::with_delegate(info.clone(), delegate));
        let (finish, state) = record.flags();
        self.registry.register(task_id, record.clone());
        record.set_running();
        info!("{} {} {} started", task_id, method, info.url());
        self.transport.resume(task_id);

        Ok(TaskHandle {
            info,
            transport: self.transport.clone(),
            finish,
            state,
        })
    }

    /// Replaces the pinning policy used by future trust evaluations.
    ///
    /// Evaluations already running finish with the policy they started with.
    pub fn set_pinning_policy(&self, policy: PinningPolicy) {
        info!("pinning policy replaced, mode {:?}", policy.mode());
        *self.policy.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(policy);
    }

    /// Returns the current pinning policy.
    pub fn pinning_policy(&self) -> Arc<PinningPolicy> {
        current_policy(&self.policy)
    }

    /// Returns the record of an in-flight task.
    pub fn task(&self, task_id: TaskId) -> Option<Arc<TaskRecord>> {
        self.registry.lookup(task_id)
    }

    /// Lists in-flight tasks, optionally only those of one kind.
    pub fn tasks(&self, kind: Option<TaskKind>) -> Vec<TaskInfo> {
        let mut tasks = Vec::new();
        self.registry.for_each(|_, record| {
            if kind.map(|k| k == record.info().kind()).unwrap_or(true) {
                tasks.push(record.info().clone());
            }
        });
        tasks.sort_by_key(|info| info.task_id());
        tasks
    }

    /// Asks the transport to cancel every in-flight task matching
    /// `predicate` and returns how many were matched.
    ///
    /// Cancelled tasks complete later with [`SessionError::Cancelled`].
    pub fn cancel_matching<P>(&self, predicate: P) -> usize
    where
        P: Fn(&TaskInfo) -> bool,
    {
        let mut matched = Vec::new();
        self.registry.for_each(|task_id, record| {
            if predicate(record.info()) {
                matched.push(task_id);
            }
        });
        for task_id in matched.iter() {
            self.transport.cancel(*task_id);
        }
        info!("cancel requested for {} tasks", matched.len());
        matched.len()
    }

    /// Asks the transport to cancel every in-flight task.
    pub fn cancel_all(&self) -> usize {
        self.cancel_matching(|_| true)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let pending = self.registry.task_ids();
        if pending.is_empty() {
            return;
        }
        info!("session invalidated with {} tasks in flight", pending.len());
        for task_id in pending.iter() {
            self.transport.cancel(*task_id);
        }
        // Tasks the transport did not complete synchronously never will.
        for task_id in pending {
            if let Some(record) = self.registry.unregister(task_id) {
                record.complete(Some(HttpClientError::new(
                    HttpErrorCode::HttpTaskCanceled,
                    "session invalidated",
                )));
            }
        }
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    transport: Arc<dyn Transport>,
    policy: PinningPolicy,
    system_trust: Option<Arc<dyn SystemTrust>>,
    server_trust_handling: ServerTrustHandling,
    credential_provider: Option<Arc<dyn CredentialProvider>>,
    redirect_policy: Option<Arc<dyn RedirectPolicy>>,
    manual_upload_progress: bool,
}

impl SessionBuilder {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            policy: PinningPolicy::default(),
            system_trust: None,
            server_trust_handling: ServerTrustHandling::default(),
            credential_provider: None,
            redirect_policy: None,
            manual_upload_progress: false,
        }
    }

    /// Sets the initial pinning policy.
    pub fn policy(&mut self, policy: PinningPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Sets the verifier used for default system trust validation.
    ///
    /// Without one, a [`WebPkiSystemTrust`] trusting the Mozilla root
    /// program is used.
    pub fn system_trust(&mut self, system_trust: Arc<dyn SystemTrust>) -> &mut Self {
        self.system_trust = Some(system_trust);
        self
    }

    /// Sets how server-trust challenges are answered.
    pub fn server_trust_handling(&mut self, handling: ServerTrustHandling) -> &mut Self {
        self.server_trust_handling = handling;
        self
    }

    /// Sets the provider answering client authentication challenges.
    pub fn credential_provider(&mut self, provider: Arc<dyn CredentialProvider>) -> &mut Self {
        self.credential_provider = Some(provider);
        self
    }

    /// Sets the policy deciding on redirects.
    pub fn redirect_policy(&mut self, policy: Arc<dyn RedirectPolicy>) -> &mut Self {
        self.redirect_policy = Some(policy);
        self
    }

    /// Tracks upload progress of streamed bodies by counting bytes read.
    pub fn manual_upload_progress(&mut self, enabled: bool) -> &mut Self {
        self.manual_upload_progress = enabled;
        self
    }

    /// Creates the session and installs it as the transport's delegate.
    pub fn build(self) -> Session {
        let registry = Arc::new(TaskRegistry::new());
        let policy = Arc::new(RwLock::new(Arc::new(self.policy)));
        let system_trust = self
            .system_trust
            .unwrap_or_else(|| Arc::new(WebPkiSystemTrust::default()));
        let dispatcher = Arc::new(SessionDispatcher::new(
            registry.clone(),
            policy.clone(),
            TrustEvaluator::new(system_trust),
            self.server_trust_handling,
            self.credential_provider,
            self.redirect_policy,
        ));
        let delegate: Arc<dyn SessionDelegate> = dispatcher.clone();
        self.transport.set_delegate(Arc::downgrade(&delegate));

        Session {
            transport: self.transport,
            registry,
            policy,
            _dispatcher: dispatcher,
            manual_upload_progress: self.manual_upload_progress,
        }
    }
}

/// Caller-side handle of a submitted task.
#[derive(Clone)]
pub struct TaskHandle {
    info: TaskInfo,
    transport: Arc<dyn Transport>,
    finish: Arc<AtomicBool>,
    state: Arc<AtomicUsize>,
}

impl TaskHandle {
    /// Transport identifier of the task.
    pub fn task_id(&self) -> TaskId {
        self.info.task_id()
    }

    /// Description of the task.
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

    /// Asks the transport to cancel the task. Does nothing once finished.
    pub fn cancel(&self) {
        if self.is_finished() {
            return;
        }
        info!("{} cancel requested", self.task_id());
        self.transport.cancel(self.task_id());
    }

    /// Suspends a running task.
    pub fn suspend(&self) {
        if self
            .state
            .compare_exchange(RUNNING, SUSPEND, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.transport.suspend(self.task_id());
        }
    }

    /// Resumes a suspended task.
    pub fn resume(&self) {
        if self
            .state
            .compare_exchange(SUSPEND, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.transport.resume(self.task_id());
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("info", &self.info)
            .field("state", &self.state())
            .finish()
    }
}

/// Sending half of [`completion_channel`].
#[derive(Clone)]
pub struct CompletionSender {
    tx: mpsc::Sender<TaskOutcome>,
}

impl CompletionSender {
    /// Returns a completion callback forwarding the outcome to the channel.
    pub fn callback(&self) -> impl FnOnce(TaskOutcome) + Send + 'static {
        let tx = self.tx.clone();
        move |outcome| {
            let _ = tx.send(outcome);
        }
    }
}

/// Creates a channel receiving the outcomes of the tasks submitted with
/// callbacks from the returned sender.
///
/// # Examples
///
/// ```no_run
/// # fn demo(session: &session_core::Session) {
/// use session_core::completion_channel;
/// use session_transport::Request;
///
/// let (sender, outcomes) = completion_channel();
/// let request = Request::get("https://example.com").unwrap();
/// session.submit(request, sender.callback(), None).unwrap();
/// let outcome = outcomes.recv().unwrap();
/// println!("{:?}", outcome.error);
/// # }
/// ```
pub fn completion_channel() -> (CompletionSender, mpsc::Receiver<TaskOutcome>) {
    let (tx, rx) = mpsc::channel();
    (CompletionSender { tx }, rx)
}
