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

//! External process control.
//!
//! Tunnels are plain `ssh` processes owned by the operating system. This
//! module launches them and finds or signals them again by command-line
//! pattern with `pgrep -f` and `pkill -f`.
//!
//! # Exit status conventions
//!
//! Both procps and BSD `pgrep`/`pkill` exit with:
//!
//! - 0: one or more processes matched
//! - 1: no process matched
//! - 2: syntax error in the command line
//! - 3: fatal error

use async_trait::async_trait;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use super::command::TunnelCommand;
use crate::error::ProxyError;

/// Default time allowed for any single external tool invocation
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const EXIT_NO_MATCH: i32 = 1;

/// Locations of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ssh: String,
    pub pgrep: String,
    pub pkill: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ssh: "ssh".to_string(),
            pgrep: "pgrep".to_string(),
            pkill: "pkill".to_string(),
        }
    }
}

/// Result of running the foreground part of an ssh launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub success: bool,
    /// Human readable exit status, e.g. `exit status: 255`.
    pub status: String,
}

impl From<ExitStatus> for LaunchOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            status: status.to_string(),
        }
    }
}

/// Operations on the operating system's process table.
///
/// Every command handler goes through this trait, so no handler spawns a
/// process directly.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Program used as argv\[0\] for new tunnels.
    fn ssh_program(&self) -> &str {
        "ssh"
    }

    /// Run a tunnel command and wait for its foreground part to exit.
    async fn launch(&self, command: &TunnelCommand) -> Result<LaunchOutcome, ProxyError>;

    /// PIDs of processes whose full command line matches `pattern`.
    async fn find(&self, pattern: &str) -> Result<Vec<u32>, ProxyError>;

    /// Send SIGTERM to every process whose command line matches `pattern`.
    ///
    /// Returns `false` when nothing matched.
    async fn signal(&self, pattern: &str) -> Result<bool, ProxyError>;
}

/// [`ProcessControl`] backed by the real `ssh`, `pgrep` and `pkill` binaries.
#[derive(Debug, Clone)]
pub struct SystemProcessControl {
    tools: ToolPaths,
    timeout_secs: u64,
}

impl Default for SystemProcessControl {
    fn default() -> Self {
        Self::new(ToolPaths::default())
    }
}

impl SystemProcessControl {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the per-invocation timeout in seconds. 0 disables it.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Run a short-lived inspection tool and collect its output.
    async fn run_captured(&self, program: &str, args: &[&str]) -> Result<Output, ProxyError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ProxyError::SubprocessLaunchFailed {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        let output = match self.timeout() {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| {
                    tracing::warn!(
                        program = %program,
                        "Process exceeded timeout of {}s, killing it",
                        self.timeout_secs
                    );
                    ProxyError::SubprocessTimedOut {
                        program: program.to_string(),
                        secs: self.timeout_secs,
                    }
                })?,
            None => child.wait_with_output().await,
        };

        output.map_err(|e| ProxyError::SubprocessLaunchFailed {
            program: program.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ProcessControl for SystemProcessControl {
    fn ssh_program(&self) -> &str {
        &self.tools.ssh
    }

    async fn launch(&self, command: &TunnelCommand) -> Result<LaunchOutcome, ProxyError> {
        tracing::debug!(proxy = %command.proxy(), command = %command, "Launching tunnel");

        // stdio is inherited: after `-f` the daemonised ssh can keep copies of
        // its descriptors, so a captured pipe would never reach EOF.
        let mut cmd = Command::new(command.program());
        cmd.args(command.args()).kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| ProxyError::SubprocessLaunchFailed {
                program: command.program().to_string(),
                reason: e.to_string(),
            })?;

        let status = match self.timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!(
                        proxy = %command.proxy(),
                        "ssh did not background itself within {}s, killing it",
                        self.timeout_secs
                    );
                    let _ = child.kill().await;
                    return Err(ProxyError::SubprocessTimedOut {
                        program: command.program().to_string(),
                        secs: self.timeout_secs,
                    });
                }
            },
            None => child.wait().await,
        }
        .map_err(|e| ProxyError::SubprocessLaunchFailed {
            program: command.program().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(proxy = %command.proxy(), status = %status, "ssh returned");
        Ok(LaunchOutcome::from(status))
    }

    async fn find(&self, pattern: &str) -> Result<Vec<u32>, ProxyError> {
        let program = self.tools.pgrep.as_str();
        let output = self.run_captured(program, &["-f", pattern]).await?;

        match output.status.code() {
            Some(0) => {
                let pids = parse_pids(&String::from_utf8_lossy(&output.stdout));
                tracing::debug!(pattern = %pattern, pids = ?pids, "pgrep matched");
                Ok(pids)
            }
            Some(EXIT_NO_MATCH) => {
                tracing::debug!(pattern = %pattern, "pgrep found no match");
                Ok(Vec::new())
            }
            _ => Err(ProxyError::SubprocessLaunchFailed {
                program: program.to_string(),
                reason: describe_failure(&output),
            }),
        }
    }

    async fn signal(&self, pattern: &str) -> Result<bool, ProxyError> {
        let program = self.tools.pkill.as_str();
        let output = self
            .run_captured(program, &["-f", pattern])
            .await
            .map_err(|e| match e {
                ProxyError::SubprocessLaunchFailed { program, reason } => {
                    ProxyError::SubprocessSignalFailed { program, reason }
                }
                other => other,
            })?;

        match output.status.code() {
            Some(0) => {
                tracing::debug!(pattern = %pattern, "pkill signalled matching processes");
                Ok(true)
            }
            Some(EXIT_NO_MATCH) => {
                tracing::debug!(pattern = %pattern, "pkill found no match");
                Ok(false)
            }
            _ => Err(ProxyError::SubprocessSignalFailed {
                program: program.to_string(),
                reason: describe_failure(&output),
            }),
        }
    }
}

/// Parse `pgrep` output, one PID per line.
pub fn parse_pids(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter_map(|pid| pid.parse().ok())
        .collect()
}

fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        format!("{} ({})", stderr, output.status)
    }
}
