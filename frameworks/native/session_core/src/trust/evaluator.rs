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

//! Decides whether a presented server identity is acceptable.

use std::sync::Arc;

use thiserror::Error;

use super::certificate::spki_of;
use super::policy::{PinningMode, PinningPolicy};
use super::system::SystemTrust;

/// Why a chain was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    /// The server presented no certificate.
    #[error("empty certificate chain")]
    EmptyChain,
    /// A presented certificate could not be parsed.
    #[error("malformed certificate")]
    Malformed,
    /// A certificate is outside its validity period.
    #[error("certificate outside its validity period")]
    Expired,
    /// The leaf certificate may not authenticate a TLS server.
    #[error("certificate not valid for server authentication")]
    InvalidPurpose,
    /// The leaf certificate does not name the host.
    #[error("certificate does not match the host")]
    HostnameMismatch,
    /// No signature path leads to a trust anchor.
    #[error("certificate chain does not lead to a trusted anchor")]
    UntrustedIssuer,
    /// No presented certificate equals a pinned certificate.
    #[error("no presented certificate is pinned")]
    CertificateMismatch,
    /// No presented certificate carries a pinned public key.
    #[error("no presented public key is pinned")]
    PublicKeyMismatch,
}

/// Outcome of a trust evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrustDecision {
    /// The server identity is acceptable.
    Accept,
    /// The server identity is not acceptable.
    Reject(RejectReason),
}

impl TrustDecision {
    /// Returns `true` for [`TrustDecision::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, TrustDecision::Accept)
    }
}

/// Evaluates presented chains against a [`PinningPolicy`].
///
/// Evaluation depends only on the policy, the chain, the host and the
/// configured [`SystemTrust`]; it holds no mutable state and may run on any
/// number of threads at once.
#[derive(Clone)]
pub struct TrustEvaluator {
    system: Arc<dyn SystemTrust>,
}

impl TrustEvaluator {
    /// Creates an evaluator using `system` for default validation.
    pub fn new(system: Arc<dyn SystemTrust>) -> Self {
        Self { system }
    }

    /// Evaluates `chain` (DER, leaf first) presented by `host`.
    ///
    /// Hosts exempt from pinning are evaluated as [`PinningMode::None`]
    /// before the invalid-certificate escape hatch is considered.
    pub fn evaluate(&self, policy: &PinningPolicy, chain: &[Vec<u8>], host: &str) -> TrustDecision {
        if chain.is_empty() {
            return TrustDecision::Reject(RejectReason::EmptyChain);
        }
        let mut keys = Vec::with_capacity(chain.len());
        for der in chain {
            match spki_of(der) {
                Some(key) => keys.push(key),
                None => return TrustDecision::Reject(RejectReason::Malformed),
            }
        }

        if policy.mode() == PinningMode::None || policy.is_exempt(host) {
            return self.system_decision(chain, host);
        }

        if policy.validates_system_trust() && !policy.allows_invalid_certificates() {
            if let TrustDecision::Reject(reason) = self.system_decision(chain, host) {
                return TrustDecision::Reject(reason);
            }
        }

        match policy.mode() {
            PinningMode::Certificate => {
                let pinned = chain.iter().any(|der| {
                    policy
                        .certificates()
                        .iter()
                        .any(|cert| cert.der() == der.as_slice())
                });
                if pinned {
                    TrustDecision::Accept
                } else {
                    TrustDecision::Reject(RejectReason::CertificateMismatch)
                }
            }
            PinningMode::PublicKey => {
                let pinned = keys.iter().any(|spki| {
                    policy
                        .public_keys()
                        .iter()
                        .any(|key| key.spki() == spki.as_slice())
                });
                if pinned {
                    TrustDecision::Accept
                } else {
                    TrustDecision::Reject(RejectReason::PublicKeyMismatch)
                }
            }
            PinningMode::None => self.system_decision(chain, host),
        }
    }

    fn system_decision(&self, chain: &[Vec<u8>], host: &str) -> TrustDecision {
        match self.system.verify(chain, host) {
            Ok(()) => TrustDecision::Accept,
            Err(reason) => TrustDecision::Reject(reason),
        }
    }
}
