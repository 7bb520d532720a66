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
use tracing::{debug, warn};

use crate::config::{ProxyConfig, ProxyTable, ALL_PROXIES};
use crate::error::ProxyError;
use crate::tunnel::{ProcessControl, TunnelCommand};
use crate::ui::{report_invalid, OutputFormatter};

/// Result of signalling the tunnels of every configured proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectSummary {
    pub total: usize,
    pub stopped: Vec<String>,
    pub not_running: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl DisconnectSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Disconnect one proxy, or every proxy when `target` is `all`.
pub async fn disconnect(
    table: &ProxyTable,
    target: &str,
    control: &dyn ProcessControl,
) -> Result<(), ProxyError> {
    if target == ALL_PROXIES {
        disconnect_all(table, control).await.map(|_| ())
    } else {
        disconnect_proxy(table, target, control).await.map(|_| ())
    }
}

/// Signal the ssh tunnel of one proxy.
///
/// Returns whether any process was matched. A proxy with nothing running is
/// not an error.
pub async fn disconnect_proxy(
    table: &ProxyTable,
    name: &str,
    control: &dyn ProcessControl,
) -> Result<bool, ProxyError> {
    let proxy = table.get(name)?;
    let stopped = signal_proxy(control, proxy).await?;

    if stopped {
        println!(
            "{} {} disconnected",
            "○".if_supports_color(Stream::Stdout, |t| t.dimmed()),
            name.if_supports_color(Stream::Stdout, |t| t.bold())
        );
    } else {
        println!(
            "{} {} was not running",
            "○".if_supports_color(Stream::Stdout, |t| t.dimmed()),
            name.if_supports_color(Stream::Stdout, |t| t.bold())
        );
    }
    Ok(stopped)
}

/// Signal every configured proxy, continuing past individual failures.
pub async fn disconnect_all(
    table: &ProxyTable,
    control: &dyn ProcessControl,
) -> Result<DisconnectSummary, ProxyError> {
    report_invalid(table);

    let mut summary = DisconnectSummary {
        total: table.len(),
        ..Default::default()
    };

    for proxy in table.proxies() {
        match signal_proxy(control, proxy).await {
            Ok(true) => {
                println!(
                    "  {} {} disconnected",
                    "○".if_supports_color(Stream::Stdout, |t| t.dimmed()),
                    proxy.name.if_supports_color(Stream::Stdout, |t| t.bold())
                );
                summary.stopped.push(proxy.name.clone());
            }
            Ok(false) => summary.not_running.push(proxy.name.clone()),
            Err(e) => {
                warn!("Failed to disconnect '{}': {}", proxy.name, e);
                let message = e.to_string();
                println!(
                    "  {} {} {}",
                    "✗".if_supports_color(Stream::Stdout, |t| t.red()),
                    proxy.name.if_supports_color(Stream::Stdout, |t| t.bold()),
                    message.if_supports_color(Stream::Stdout, |t| t.red())
                );
                summary.failed.push((proxy.name.clone(), message));
            }
        }
    }

    if summary.stopped.is_empty() && summary.is_success() {
        println!("No active proxies were found to disconnect.");
        return Ok(summary);
    }

    println!(
        "{}",
        OutputFormatter::format_summary(
            summary.total,
            "disconnected",
            summary.stopped.len(),
            summary.failed.len()
        )
    );

    if summary.is_success() {
        Ok(summary)
    } else {
        Err(ProxyError::DisconnectAllFailed {
            failed: summary.failed.len(),
            total: summary.total,
        })
    }
}

async fn signal_proxy(
    control: &dyn ProcessControl,
    proxy: &ProxyConfig,
) -> Result<bool, ProxyError> {
    let command = TunnelCommand::for_proxy(control.ssh_program(), proxy);
    let pattern = command.match_pattern();
    debug!("Signalling processes matching {}", pattern);
    control.signal(&pattern).await
}
