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

//! Command dispatcher for routing CLI commands to their implementations

use anyhow::{Context, Result};

use crate::cli::Commands;
use crate::commands::{connect_proxy, disconnect, list_proxies, show_proxy_info, show_status};
use crate::config::ProxyTable;
use crate::tunnel::ProcessControl;

/// Dispatch a subcommand against a loaded table and a process controller.
pub async fn dispatch_command(
    command: &Commands,
    table: &ProxyTable,
    control: &dyn ProcessControl,
) -> Result<()> {
    match command {
        Commands::List => list_proxies(table).context("Failed to write proxy list"),
        Commands::Info { proxy_name } => {
            show_proxy_info(table, proxy_name, control.ssh_program())
                .with_context(|| format!("Cannot show proxy '{proxy_name}'"))
        }
        Commands::Connect { proxy_name } => connect_proxy(table, proxy_name, control)
            .await
            .map(|_| ())
            .with_context(|| format!("Cannot connect proxy '{proxy_name}'")),
        Commands::Disconnect { proxy_name } => disconnect(table, proxy_name, control)
            .await
            .with_context(|| format!("Cannot disconnect '{proxy_name}'")),
        Commands::Status { verbose } => show_status(table, control, *verbose)
            .await
            .map(|_| ())
            .context("Cannot read proxy status"),
    }
}
