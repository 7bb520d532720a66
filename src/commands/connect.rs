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

use owo_colors::{OwoColorize, Stream};
use tracing::{debug, info};

use crate::config::ProxyTable;
use crate::error::ProxyError;
use crate::tunnel::{probe, ProcessControl, TunnelCommand, TunnelState};

/// What `connect` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Established,
    AlreadyConnected { pids: Vec<u32> },
}

/// Start the SOCKS tunnel for one proxy unless it is already running.
///
/// The process table is checked first so a second `connect` never stacks a
/// duplicate ssh onto an occupied port. The launch itself succeeds when ssh
/// exits 0 after backgrounding.
pub async fn connect_proxy(
    table: &ProxyTable,
    name: &str,
    control: &dyn ProcessControl,
) -> Result<ConnectOutcome, ProxyError> {
    let proxy = table.get(name)?;

    let (state, pids) = probe(control, proxy).await?;
    if state == TunnelState::Connected {
        debug!("Proxy '{}' already has ssh processes {:?}", name, pids);
        println!(
            "{} {} is already connected on port {}",
            "●".if_supports_color(Stream::Stdout, |t| t.green()),
            name.if_supports_color(Stream::Stdout, |t| t.bold()),
            proxy.port
        );
        return Ok(ConnectOutcome::AlreadyConnected { pids });
    }

    let command = TunnelCommand::for_proxy(control.ssh_program(), proxy);
    let display = command.shell_display();
    println!(
        "Establishing SOCKS proxy with: {}",
        display.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );

    let outcome = control.launch(&command).await?;
    if !outcome.success {
        return Err(ProxyError::ConnectFailed {
            proxy: name.to_string(),
            status: outcome.status,
        });
    }

    info!("Proxy '{}' listening on localhost:{}", name, proxy.port);
    println!(
        "{} {} connected, SOCKS listener on localhost:{}",
        "●".if_supports_color(Stream::Stdout, |t| t.green()),
        name.if_supports_color(Stream::Stdout, |t| t.bold()),
        proxy.port
    );
    Ok(ConnectOutcome::Established)
}
