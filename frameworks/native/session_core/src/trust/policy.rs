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

//! Pinning policy: which server identities a session accepts.

use std::collections::HashSet;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use session_utils::debug;

use super::certificate::{Certificate, PublicKey};
use crate::error::SessionError;

/// What a server must present, besides passing system trust, to be accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinningMode {
    /// No pinning. Only system trust validation applies.
    #[default]
    None,
    /// One presented certificate must equal a pinned certificate.
    Certificate,
    /// One presented certificate must carry a pinned public key.
    PublicKey,
}

/// Immutable trust configuration shared by all evaluations of a session.
///
/// A policy is never mutated after construction. Sessions replace it
/// wholesale, so evaluations in flight keep the policy they started with.
///
/// # Examples
///
/// ```
/// use session_core::trust::{PinningMode, PinningPolicy};
///
/// let policy = PinningPolicy::new(PinningMode::None)
///     .with_exempt_domains(["Localhost"]);
/// assert!(policy.is_exempt("localhost"));
/// assert!(policy.validates_system_trust());
/// ```
#[derive(Clone, Debug)]
pub struct PinningPolicy {
    mode: PinningMode,
    certificates: Vec<Certificate>,
    public_keys: Vec<PublicKey>,
    validates_system_trust: bool,
    allow_invalid_certificates: bool,
    exempt_domains: HashSet<String>,
}

impl PinningPolicy {
    /// Creates a policy without pinned certificates that validates system
    /// trust.
    pub fn new(mode: PinningMode) -> Self {
        Self {
            mode,
            certificates: Vec::new(),
            public_keys: Vec::new(),
            validates_system_trust: true,
            allow_invalid_certificates: false,
            exempt_domains: HashSet::new(),
        }
    }

    /// Sets the pinned certificates and extracts their public keys.
    pub fn with_certificates(mut self, certificates: Vec<Certificate>) -> Self {
        self.public_keys = certificates.iter().map(|c| c.public_key().clone()).collect();
        self.public_keys.dedup();
        self.certificates = certificates;
        self
    }

    /// Sets whether system trust validation also applies to pinned modes.
    pub fn with_system_trust(mut self, validates: bool) -> Self {
        self.validates_system_trust = validates;
        self
    }

    /// Skips system trust validation in pinned modes. Meant for tests
    /// against servers with self-signed certificates.
    pub fn allow_invalid_certificates(mut self, allow: bool) -> Self {
        self.allow_invalid_certificates = allow;
        self
    }

    /// Sets the hosts evaluated as [`PinningMode::None`] regardless of mode.
    pub fn with_exempt_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exempt_domains = domains
            .into_iter()
            .map(|d| d.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// Pinning mode.
    pub fn mode(&self) -> PinningMode {
        self.mode
    }

    /// Pinned certificates.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Public keys of the pinned certificates.
    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    /// Whether system trust validation also applies in pinned modes.
    pub fn validates_system_trust(&self) -> bool {
        self.validates_system_trust
    }

    /// Whether system trust validation is skipped in pinned modes.
    pub fn allows_invalid_certificates(&self) -> bool {
        self.allow_invalid_certificates
    }

    /// Returns `true` if `host` is exempt from pinning, ignoring case.
    pub fn is_exempt(&self, host: &str) -> bool {
        self.exempt_domains.contains(&host.to_ascii_lowercase())
    }

    /// Returns the serializable form of this policy.
    pub fn to_config(&self) -> PolicyConfig {
        let mut exempt_domains = self.exempt_domains.iter().cloned().collect::<Vec<_>>();
        exempt_domains.sort();
        PolicyConfig {
            mode: self.mode,
            certificates: self
                .certificates
                .iter()
                .map(|c| STANDARD.encode(c.der()))
                .collect(),
            certificate_dir: None,
            validates_system_trust: self.validates_system_trust,
            allow_invalid_certificates: self.allow_invalid_certificates,
            exempt_domains,
        }
    }

    /// Builds a policy from its serializable form.
    ///
    /// Certificates listed inline come first, followed by those loaded from
    /// `certificate_dir`.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, SessionError> {
        let mut certificates = Vec::with_capacity(config.certificates.len());
        for encoded in config.certificates.iter() {
            let der = STANDARD
                .decode(encoded.trim())
                .map_err(|e| SessionError::Config(format!("invalid base64 certificate: {}", e)))?;
            certificates.push(Certificate::from_der(der)?);
        }
        if let Some(dir) = config.certificate_dir.as_ref() {
            certificates.extend(Certificate::load_dir(dir)?);
        }
        if config.mode != PinningMode::None && certificates.is_empty() {
            debug!("pinning mode {:?} without pinned certificates", config.mode);
        }
        Ok(Self::new(config.mode)
            .with_certificates(certificates)
            .with_system_trust(config.validates_system_trust)
            .allow_invalid_certificates(config.allow_invalid_certificates)
            .with_exempt_domains(config.exempt_domains.iter()))
    }
}

impl Default for PinningPolicy {
    fn default() -> Self {
        Self::new(PinningMode::None)
    }
}

/// Serializable form of a [`PinningPolicy`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Pinning mode.
    pub mode: PinningMode,
    /// Base64 encoded DER certificates.
    pub certificates: Vec<String>,
    /// Directory of additional certificates to pin.
    pub certificate_dir: Option<PathBuf>,
    /// Whether system trust validation also applies in pinned modes.
    pub validates_system_trust: bool,
    /// Whether system trust validation is skipped in pinned modes.
    pub allow_invalid_certificates: bool,
    /// Hosts exempt from pinning.
    pub exempt_domains: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: PinningMode::None,
            certificates: Vec::new(),
            certificate_dir: None,
            validates_system_trust: true,
            allow_invalid_certificates: false,
            exempt_domains: Vec::new(),
        }
    }
}
