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

//! Certificates and public keys used for pinning and trust anchors.

use std::fmt;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use session_utils::info;
use sha2::{Digest, Sha256};
use x509_parser::parse_x509_certificate;

use crate::error::SessionError;

const CERT_EXTENSIONS: &[&str] = &["cer", "crt", "der", "pem"];
const PEM_MARKER: &[u8] = b"-----BEGIN";

/// A parsed X.509 certificate kept in DER form.
///
/// The SubjectPublicKeyInfo is extracted once at construction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Vec<u8>,
    public_key: PublicKey,
}

/// A DER encoded SubjectPublicKeyInfo: algorithm identifier and key bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    spki: Vec<u8>,
}

impl Certificate {
    /// Parses a DER encoded certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, SessionError> {
        let der = der.into();
        let spki = spki_of(&der)
            .ok_or_else(|| SessionError::Config("malformed DER certificate".to_string()))?;
        Ok(Self {
            der,
            public_key: PublicKey { spki },
        })
    }

    /// Parses every certificate of a PEM bundle.
    pub fn from_pem(pem: &[u8]) -> Result<Vec<Self>, SessionError> {
        let mut reader = BufReader::new(pem);
        let mut certs = Vec::new();
        for der in rustls_pemfile::certs(&mut reader) {
            let der = der.map_err(|e| SessionError::Config(format!("invalid PEM: {}", e)))?;
            certs.push(Self::from_der(der.as_ref())?);
        }
        if certs.is_empty() {
            return Err(SessionError::Config(
                "no certificate found in PEM data".to_string(),
            ));
        }
        Ok(certs)
    }

    /// Loads the certificates of a DER or PEM file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Self>, SessionError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let certs = if is_pem(&bytes) {
            Self::from_pem(&bytes)
        } else {
            Self::from_der(bytes).map(|c| vec![c])
        };
        certs.map_err(|e| SessionError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Loads every `.cer`, `.crt`, `.der` and `.pem` file of a directory.
    ///
    /// Files are read in name order. Other files are skipped.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Self>, SessionError> {
        let mut paths = fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_cert_extension(path))
            .collect::<Vec<_>>();
        paths.sort();

        let mut certs = Vec::new();
        for path in paths {
            certs.extend(Self::load_file(&path)?);
        }
        info!(
            "loaded {} certificates from {}",
            certs.len(),
            dir.as_ref().display()
        );
        Ok(certs)
    }

    /// Returns the DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the public key of the certificate.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the hex SHA-256 fingerprint of the DER encoding.
    pub fn fingerprint(&self) -> String {
        sha256_hex(&self.der)
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Certificate")
            .field(&self.fingerprint())
            .finish()
    }
}

impl PublicKey {
    /// Returns the DER encoded SubjectPublicKeyInfo.
    pub fn spki(&self) -> &[u8] {
        &self.spki
    }

    /// Returns the hex SHA-256 fingerprint of the SubjectPublicKeyInfo.
    pub fn fingerprint(&self) -> String {
        sha256_hex(&self.spki)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.fingerprint()).finish()
    }
}

/// Extracts the SubjectPublicKeyInfo of a DER certificate.
///
/// Returns `None` for anything that is not exactly one well formed
/// certificate.
pub(crate) fn spki_of(der: &[u8]) -> Option<Vec<u8>> {
    match parse_x509_certificate(der) {
        Ok((rest, cert)) if rest.is_empty() => Some(cert.public_key().raw.to_vec()),
        _ => None,
    }
}

fn is_pem(bytes: &[u8]) -> bool {
    bytes
        .windows(PEM_MARKER.len())
        .any(|window| window == PEM_MARKER)
}

fn has_cert_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            CERT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
