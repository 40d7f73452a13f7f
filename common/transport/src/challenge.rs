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

//! Authentication challenges raised by the transport.
//!
//! A challenge is either a server-trust challenge carrying the certificate
//! chain presented during the TLS handshake, or a request for client
//! credentials. The receiver answers with a [`ChallengeDisposition`].

/// Authentication method a challenge asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    /// The server presented a certificate chain that must be evaluated.
    ServerTrust,
    /// HTTP Basic authentication.
    HttpBasic,
    /// HTTP Digest authentication.
    HttpDigest,
    /// NTLM authentication.
    Ntlm,
    /// Negotiate (Kerberos or NTLM) authentication.
    Negotiate,
    /// The server requested a client certificate.
    ClientCertificate,
}

/// An authentication challenge for one protection space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthChallenge {
    host: String,
    port: u16,
    method: AuthMethod,
    realm: Option<String>,
    server_chain: Vec<Vec<u8>>,
    previous_failure_count: u32,
}

impl AuthChallenge {
    /// Creates a server-trust challenge.
    ///
    /// `chain` holds the DER encoded certificates in the order the server
    /// presented them, leaf first.
    pub fn server_trust(host: &str, port: u16, chain: Vec<Vec<u8>>) -> Self {
        Self {
            host: host.to_string(),
            port,
            method: AuthMethod::ServerTrust,
            realm: None,
            server_chain: chain,
            previous_failure_count: 0,
        }
    }

    /// Creates a client-credential challenge.
    pub fn credential(host: &str, port: u16, method: AuthMethod, realm: Option<&str>) -> Self {
        Self {
            host: host.to_string(),
            port,
            method,
            realm: realm.map(str::to_string),
            server_chain: Vec::new(),
            previous_failure_count: 0,
        }
    }

    /// Sets how many times credentials were already rejected for this space.
    pub fn with_previous_failure_count(mut self, count: u32) -> Self {
        self.previous_failure_count = count;
        self
    }

    /// Host of the protection space.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of the protection space.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Authentication method requested.
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// Realm of the protection space, if any.
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// DER encoded certificates presented by the server, leaf first.
    ///
    /// Empty for challenges other than [`AuthMethod::ServerTrust`].
    pub fn server_chain(&self) -> &[Vec<u8>] {
        &self.server_chain
    }

    /// Number of previously rejected credentials.
    pub fn previous_failure_count(&self) -> u32 {
        self.previous_failure_count
    }

    /// Returns `true` for server-trust challenges.
    pub fn is_server_trust(&self) -> bool {
        self.method == AuthMethod::ServerTrust
    }
}

/// Credential used to answer a challenge.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Trust the certificate chain presented by the server.
    ServerTrust,
    /// User name and password.
    Password {
        /// User name.
        user: String,
        /// Password.
        password: String,
    },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ServerTrust => f.write_str("ServerTrust"),
            Credential::Password { user, .. } => f
                .debug_struct("Password")
                .field("user", user)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Answer to an authentication challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeDisposition {
    /// Continue with the given credential.
    UseCredential(Credential),
    /// Let the transport apply its default handling.
    PerformDefaultHandling,
    /// Cancel the challenge; the task fails.
    CancelChallenge,
    /// Reject this protection space and let the transport try the next one.
    RejectProtectionSpace,
}
