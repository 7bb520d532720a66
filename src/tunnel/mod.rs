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

//! SSH tunnel processes.
//!
//! A proxy is either connected or disconnected, and the answer always comes
//! from the process table: nothing about a tunnel is stored between runs.

pub mod command;
pub mod process;

pub use command::{escape_ere, TunnelCommand};
pub use process::{
    parse_pids, LaunchOutcome, ProcessControl, SystemProcessControl, ToolPaths,
    DEFAULT_TIMEOUT_SECS,
};

use crate::config::ProxyConfig;

/// Observable state of one proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelState {
    Disconnected,
    Connected,
}

/// Derive a proxy's state and matching PIDs from the process table.
pub async fn probe(
    control: &dyn ProcessControl,
    proxy: &ProxyConfig,
) -> Result<(TunnelState, Vec<u32>), crate::error::ProxyError> {
    let command = TunnelCommand::for_proxy(control.ssh_program(), proxy);
    let pids = control.find(&command.match_pattern()).await?;
    let state = if pids.is_empty() {
        TunnelState::Disconnected
    } else {
        TunnelState::Connected
    };
    Ok((state, pids))
}
