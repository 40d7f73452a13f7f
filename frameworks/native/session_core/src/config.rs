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

//! Session configuration loaded from TOML.
//!
//! ```toml
//! server_trust_handling = "evaluate"
//! manual_upload_progress = true
//! trust_anchor_dir = "/etc/session/anchors"
//!
//! [policy]
//! mode = "public_key"
//! certificate_dir = "/etc/session/pins"
//! exempt_domains = ["localhost"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::trust::PolicyConfig;

/// How server-trust challenges are answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerTrustHandling {
    /// Evaluate the chain against the session's pinning policy.
    #[default]
    Evaluate,
    /// Leave the decision to the transport's default handling.
    PerformDefault,
}

/// Configuration of a [`Session`](crate::Session).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How server-trust challenges are answered.
    pub server_trust_handling: ServerTrustHandling,
    /// Track upload progress by counting bytes read from streamed bodies.
    pub manual_upload_progress: bool,
    /// Directory of trust anchors for the bundled system trust verifier.
    pub trust_anchor_dir: Option<PathBuf>,
    /// Initial pinning policy.
    pub policy: PolicyConfig,
}

impl SessionConfig {
    /// Parses a configuration from TOML.
    pub fn from_toml(s: &str) -> Result<Self, SessionError> {
        Ok(toml::from_str(s)?)
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, SessionError> {
        Ok(toml::to_string(self)?)
    }

    /// Reads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }
}
