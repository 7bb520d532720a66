// Copyright 2025 Derek Smiley
//
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

//! Error types for proxy management.
//!
//! Every failure the tool can report is a variant of [`ProxyError`]. Each
//! variant maps to a process exit code through [`ProxyError::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for unclassified failures
pub const EXIT_CODE_FAILURE: i32 = 1;

/// Exit code for configuration errors
pub const EXIT_CODE_CONFIG: i32 = 2;

/// Exit code for an unknown proxy name
pub const EXIT_CODE_NOT_FOUND: i32 = 3;

/// Exit code for subprocess launch failures and failed ssh runs
pub const EXIT_CODE_LAUNCH: i32 = 4;

/// Exit code for signal failures
pub const EXIT_CODE_SIGNAL: i32 = 5;

/// Standard exit code for timeout
pub const EXIT_CODE_TIMEOUT: i32 = 124;

/// Errors that can occur while loading proxies or driving tunnel processes
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No configuration file at any searched location
    #[error("configuration file not found (searched: {})", display_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    /// The configuration file exists but could not be read
    #[error("failed to read configuration file '{}': {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a valid proxy mapping
    #[error("malformed configuration file '{}': {reason}", .path.display())]
    ConfigMalformed { path: PathBuf, reason: String },

    /// A proxy entry lacks a required field
    #[error("proxy '{proxy}' is missing required field '{field}'")]
    ProxyFieldMissing { proxy: String, field: &'static str },

    /// A proxy entry has a field with an unusable value
    #[error("proxy '{proxy}' has an invalid '{field}': {reason}")]
    ProxyFieldInvalid {
        proxy: String,
        field: &'static str,
        reason: String,
    },

    /// The requested proxy name is not configured
    #[error("proxy '{name}' not found in {}", .config.display())]
    ProxyNotFound { name: String, config: PathBuf },

    /// An external tool could not be started, or failed in an unexpected way
    #[error("failed to run '{program}': {reason}")]
    SubprocessLaunchFailed { program: String, reason: String },

    /// The ssh client ran but did not establish the tunnel
    #[error("failed to connect to '{proxy}' (ssh exited with {status})")]
    ConnectFailed { proxy: String, status: String },

    /// The signaling tool itself failed
    #[error("failed to signal processes with '{program}': {reason}")]
    SubprocessSignalFailed { program: String, reason: String },

    /// An external tool did not finish in time and was killed
    #[error("'{program}' did not finish within {secs}s and was killed")]
    SubprocessTimedOut { program: String, secs: u64 },

    /// Some proxies could not be signalled during `disconnect all`
    #[error("failed to disconnect {failed} of {total} proxies")]
    DisconnectAllFailed { failed: usize, total: usize },
}

impl ProxyError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ProxyError::ConfigNotFound { .. }
            | ProxyError::ConfigUnreadable { .. }
            | ProxyError::ConfigMalformed { .. }
            | ProxyError::ProxyFieldMissing { .. }
            | ProxyError::ProxyFieldInvalid { .. } => EXIT_CODE_CONFIG,
            ProxyError::ProxyNotFound { .. } => EXIT_CODE_NOT_FOUND,
            ProxyError::SubprocessLaunchFailed { .. } | ProxyError::ConnectFailed { .. } => {
                EXIT_CODE_LAUNCH
            }
            ProxyError::SubprocessSignalFailed { .. } | ProxyError::DisconnectAllFailed { .. } => {
                EXIT_CODE_SIGNAL
            }
            ProxyError::SubprocessTimedOut { .. } => EXIT_CODE_TIMEOUT,
        }
    }

    /// True for errors raised while loading or validating configuration
    pub fn is_config_error(&self) -> bool {
        self.exit_code() == EXIT_CODE_CONFIG
    }
}

/// Exit code for an error propagated through `anyhow`.
///
/// Errors that do not originate from [`ProxyError`] map to
/// [`EXIT_CODE_FAILURE`].
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ProxyError>())
        .map(ProxyError::exit_code)
        .unwrap_or(EXIT_CODE_FAILURE)
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no candidate paths".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
