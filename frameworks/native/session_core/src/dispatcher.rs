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

//! Routing of transport events to task records.

use std::sync::{Arc, PoisonError, RwLock};

use session_transport::{
    AuthChallenge, ChallengeDisposition, Credential, DataDisposition, HttpClientError, Request,
    Response, SessionDelegate,
};
use session_utils::task_id::TaskId;
use session_utils::{debug, info, warn};

use crate::config::ServerTrustHandling;
use crate::delegate::TaskInfo;
use crate::registry::TaskRegistry;
use crate::trust::{PinningPolicy, TrustDecision, TrustEvaluator};

/// Supplies credentials for client authentication challenges.
///
/// Server-trust challenges never reach the provider.
pub trait CredentialProvider: Send + Sync {
    /// Answers `challenge`. `task` is `None` for connection-level challenges.
    fn credential(&self, task: Option<&TaskInfo>, challenge: &AuthChallenge) -> ChallengeDisposition;
}

/// Decides whether and where a task follows a redirect.
pub trait RedirectPolicy: Send + Sync {
    /// Returns the request to follow, or `None` to stop at `response`.
    fn redirect(&self, task: &TaskInfo, response: &Response, request: Request) -> Option<Request>;
}

/// The current pinning policy of a session.
///
/// Readers clone the `Arc` and evaluate without holding the lock.
pub(crate) type PolicySlot = Arc<RwLock<Arc<PinningPolicy>>>;

pub(crate) fn current_policy(slot: &PolicySlot) -> Arc<PinningPolicy> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Receives transport events and applies them to the registered tasks.
///
/// The dispatcher holds no per-task state of its own. Events for tasks that
/// are not registered, including events arriving after completion, are
/// dropped.
pub(crate) struct SessionDispatcher {
    registry: Arc<TaskRegistry>,
    policy: PolicySlot,
    evaluator: TrustEvaluator,
    server_trust_handling: ServerTrustHandling,
    credential_provider: Option<Arc<dyn CredentialProvider>>,
    redirect_policy: Option<Arc<dyn RedirectPolicy>>,
}

impl SessionDispatcher {
    pub(crate) fn new(
        registry: Arc<TaskRegistry>,
        policy: PolicySlot,
        evaluator: TrustEvaluator,
        server_trust_handling: ServerTrustHandling,
        credential_provider: Option<Arc<dyn CredentialProvider>>,
        redirect_policy: Option<Arc<dyn RedirectPolicy>>,
    ) -> Self {
        Self {
            registry,
            policy,
            evaluator,
            server_trust_handling,
            credential_provider,
            redirect_policy,
        }
    }
}

impl SessionDelegate for SessionDispatcher {
    fn on_challenge(
        &self,
        task_id: Option<TaskId>,
        challenge: &AuthChallenge,
    ) -> ChallengeDisposition {
        let record = match task_id {
            Some(task_id) => match self.registry.lookup(task_id) {
                Some(record) => Some(record),
                None => {
                    debug!("{} challenge ignored, task not registered", task_id);
                    return ChallengeDisposition::PerformDefaultHandling;
                }
            },
            None => None,
        };

        if !challenge.is_server_trust() {
            return match self.credential_provider.as_ref() {
                Some(provider) => provider.credential(record.as_ref().map(|r| r.info()), challenge),
                None => ChallengeDisposition::PerformDefaultHandling,
            };
        }

        if self.server_trust_handling == ServerTrustHandling::PerformDefault {
            return ChallengeDisposition::PerformDefaultHandling;
        }

        let policy = current_policy(&self.policy);
        match self
            .evaluator
            .evaluate(&policy, challenge.server_chain(), challenge.host())
        {
            TrustDecision::Accept => {
                info!("server trust accepted for {}", challenge.host());
                ChallengeDisposition::UseCredential(Credential::ServerTrust)
            }
            TrustDecision::Reject(reason) => {
                warn!("server trust rejected for {}: {}", challenge.host(), reason);
                if let Some(record) = record {
                    record.reject_trust(reason);
                }
                ChallengeDisposition::CancelChallenge
            }
        }
    }

    fn on_response(&self, task_id: TaskId, response: &Response) {
        match self.registry.lookup(task_id) {
            Some(record) => record.receive_response(response),
            None => debug!("{} response ignored, task not registered", task_id),
        }
    }

    fn on_data(&self, task_id: TaskId, data: &[u8]) -> DataDisposition {
        match self.registry.lookup(task_id) {
            Some(record) => record.receive_data(data),
            None => {
                debug!("{} data ignored, task not registered", task_id);
                DataDisposition::Continue
            }
        }
    }

    fn on_upload_progress(&self, task_id: TaskId, total_sent: u64, expected: Option<u64>) {
        match self.registry.lookup(task_id) {
            Some(record) => record.send_progress(total_sent, expected),
            None => debug!("{} upload progress ignored, task not registered", task_id),
        }
    }

    fn on_redirect(&self, task_id: TaskId, response: &Response, request: Request) -> Option<Request> {
        let Some(record) = self.registry.lookup(task_id) else {
            debug!("{} redirect ignored, task not registered", task_id);
            return Some(request);
        };
        match self.redirect_policy.as_ref() {
            Some(policy) => {
                let next = policy.redirect(record.info(), response, request);
                if next.is_none() {
                    info!("{} redirect to {:?} refused", task_id, response.header("location"));
                }
                next
            }
            None => Some(request),
        }
    }

    fn on_complete(&self, task_id: TaskId, error: Option<HttpClientError>) {
        match self.registry.unregister(task_id) {
            Some(record) => record.complete(error),
            None => debug!("{} completion ignored, task not registered", task_id),
        }
    }
}
