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

//! Default system trust validation.
//!
//! Platforms normally validate a chain against their own trust store. The
//! [`SystemTrust`] trait lets a session plug that verifier in; the bundled
//! [`WebPkiSystemTrust`] runs webpki path validation for TLS server
//! authentication against the Mozilla root program or an explicit set of
//! anchors.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use rustls::client::{verify_server_cert_signed_by_trust_anchor, verify_server_name};
use rustls::pki_types::{CertificateDer, ServerName, SignatureVerificationAlgorithm, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::RootCertStore;
use session_utils::debug;
use x509_parser::certificate::X509Certificate;
use x509_parser::parse_x509_certificate;

use super::certificate::Certificate;
use super::evaluator::RejectReason;
use crate::error::SessionError;

/// Default validation of a presented certificate chain.
///
/// Implementations must be pure with respect to their inputs and must not
/// block on I/O, since they run on transport threads.
pub trait SystemTrust: Send + Sync {
    /// Validates `chain` (DER, leaf first) for `host`.
    fn verify(&self, chain: &[Vec<u8>], host: &str) -> Result<(), RejectReason>;
}

/// System trust validation with webpki.
///
/// A chain is accepted when every certificate is inside its validity period,
/// the leaf may authenticate a TLS server, the leaf names `host` and a path
/// through the presented intermediates reaches a trust anchor while honoring
/// basic, name and key usage constraints.
#[derive(Clone, Debug)]
pub struct WebPkiSystemTrust {
    roots: Arc<RootCertStore>,
    // webpki keeps only names and keys of anchors.
    path_limits: Vec<PathLimit>,
    algorithms: &'static [&'static dyn SignatureVerificationAlgorithm],
}

/// Path length constraint of an anchor, identified by its raw subject.
#[derive(Clone, Debug)]
struct PathLimit {
    subject: Vec<u8>,
    max_intermediates: u32,
}

impl WebPkiSystemTrust {
    /// Creates a verifier trusting only `anchors`.
    pub fn new(anchors: Vec<Certificate>) -> Self {
        Self::with_roots(RootCertStore::empty()).with_anchors(&anchors)
    }

    /// Creates a verifier trusting the Mozilla root program.
    pub fn with_webpki_roots() -> Self {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_roots(roots)
    }

    /// Creates a verifier trusting only the certificates of a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        Ok(Self::new(Certificate::load_dir(dir)?))
    }

    /// Adds `anchors` to the trusted roots.
    pub fn with_anchors(mut self, anchors: &[Certificate]) -> Self {
        self.path_limits
            .extend(anchors.iter().filter_map(|cert| path_limit(cert.der())));
        let roots = Arc::make_mut(&mut self.roots);
        let (added, ignored) = roots.add_parsable_certificates(
            anchors
                .iter()
                .map(|cert| CertificateDer::from(cert.der().to_vec())),
        );
        if ignored > 0 {
            debug!("{} trust anchors added, {} unusable", added, ignored);
        }
        self
    }

    /// Number of trust anchors.
    pub fn anchor_count(&self) -> usize {
        self.roots.len()
    }

    fn with_roots(roots: RootCertStore) -> Self {
        Self {
            roots: Arc::new(roots),
            path_limits: Vec::new(),
            algorithms: rustls::crypto::ring::default_provider()
                .signature_verification_algorithms
                .all,
        }
    }
}

impl Default for WebPkiSystemTrust {
    fn default() -> Self {
        Self::with_webpki_roots()
    }
}

impl SystemTrust for WebPkiSystemTrust {
    fn verify(&self, chain: &[Vec<u8>], host: &str) -> Result<(), RejectReason> {
        if chain.is_empty() {
            return Err(RejectReason::EmptyChain);
        }
        let presented = parse_all(chain)?;

        if let Some(expired) = presented.iter().find(|c| !c.validity().is_valid()) {
            debug!("certificate {} outside validity period", expired.subject());
            return Err(RejectReason::Expired);
        }
        if !allows_server_auth(&presented[0]) {
            return Err(RejectReason::InvalidPurpose);
        }

        let leaf_der = CertificateDer::from(chain[0].as_slice());
        let leaf = ParsedCertificate::try_from(&leaf_der).map_err(|_| RejectReason::Malformed)?;
        let server_name = server_name(host).ok_or(RejectReason::HostnameMismatch)?;
        if verify_server_name(&leaf, &server_name).is_err() {
            return Err(RejectReason::HostnameMismatch);
        }

        let intermediates = chain[1..]
            .iter()
            .map(|der| CertificateDer::from(der.as_slice()))
            .collect::<Vec<_>>();
        verify_server_cert_signed_by_trust_anchor(
            &leaf,
            &self.roots,
            &intermediates,
            UnixTime::now(),
            self.algorithms,
        )
        .map_err(|e| {
            debug!("no trusted path for {}: {}", host, e);
            RejectReason::UntrustedIssuer
        })?;

        if self.exceeds_path_limit(&presented) {
            debug!("path for {} longer than its anchor allows", host);
            return Err(RejectReason::UntrustedIssuer);
        }
        Ok(())
    }
}

impl WebPkiSystemTrust {
    // Follows issuer names from the leaf through presented CAs until an anchor
    // with a path length constraint is reached.
    fn exceeds_path_limit(&self, presented: &[X509Certificate<'_>]) -> bool {
        if self.path_limits.is_empty() {
            return false;
        }
        let mut used = vec![false; presented.len()];
        used[0] = true;
        let mut issuer = presented[0].issuer().as_raw();
        let mut intermediates = 0u32;
        loop {
            if let Some(limit) = self.path_limits.iter().find(|l| l.subject == issuer) {
                return intermediates > limit.max_intermediates;
            }
            let next = presented
                .iter()
                .enumerate()
                .find(|(i, cert)| !used[*i] && cert.is_ca() && cert.subject().as_raw() == issuer);
            match next {
                Some((i, cert)) => {
                    used[i] = true;
                    intermediates += 1;
                    issuer = cert.issuer().as_raw();
                }
                None => return false,
            }
        }
    }
}

fn path_limit(der: &[u8]) -> Option<PathLimit> {
    let (_, cert) = parse_x509_certificate(der).ok()?;
    let constraints = cert.basic_constraints().ok()??;
    let max_intermediates = constraints.value.path_len_constraint?;
    Some(PathLimit {
        subject: cert.subject().as_raw().to_vec(),
        max_intermediates,
    })
}

fn parse_all(chain: &[Vec<u8>]) -> Result<Vec<X509Certificate<'_>>, RejectReason> {
    chain
        .iter()
        .map(|der| match parse_x509_certificate(der) {
            Ok((rest, cert)) if rest.is_empty() => Ok(cert),
            _ => Err(RejectReason::Malformed),
        })
        .collect()
}

// Without the extension any usage is allowed.
fn allows_server_auth(leaf: &X509Certificate<'_>) -> bool {
    match leaf.extended_key_usage() {
        Ok(Some(eku)) => eku.value.server_auth,
        Ok(None) => true,
        Err(_) => false,
    }
}

fn server_name(host: &str) -> Option<ServerName<'static>> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Some(ServerName::from(ip));
    }
    ServerName::try_from(host).ok()
}
