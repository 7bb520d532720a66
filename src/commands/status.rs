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

use crate::config::ProxyTable;
use crate::error::ProxyError;
use crate::tunnel::{probe, ProcessControl, TunnelState};
use crate::ui::{report_invalid, OutputFormatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyStatus {
    pub name: String,
    pub endpoint: String,
    pub port: u16,
    pub state: TunnelState,
    pub pids: Vec<u32>,
}

/// Probe every configured proxy, in file order.
///
/// A failing probe aborts the whole report: printing "not running" for a
/// proxy whose state could not be read would be wrong.
pub async fn collect_status(
    table: &ProxyTable,
    control: &dyn ProcessControl,
) -> Result<Vec<ProxyStatus>, ProxyError> {
    let mut statuses = Vec::with_capacity(table.len());
    for proxy in table.proxies() {
        let (state, pids) = probe(control, proxy).await?;
        statuses.push(ProxyStatus {
            name: proxy.name.clone(),
            endpoint: proxy.endpoint(),
            port: proxy.port,
            state,
            pids,
        });
    }
    Ok(statuses)
}

pub async fn show_status(
    table: &ProxyTable,
    control: &dyn ProcessControl,
    verbose: bool,
) -> Result<Vec<ProxyStatus>, ProxyError> {
    report_invalid(table);

    let statuses = collect_status(table, control).await?;
    if statuses.is_empty() {
        eprintln!("No proxies configured in {}", table.path().display());
        return Ok(statuses);
    }

    println!("{}", OutputFormatter::format_section_header("Proxy Status"));

    let width = statuses.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for status in &statuses {
        let endpoint = format!("({})", status.endpoint);
        let mut line = format!(
            "  {:<width$}  {}  {}",
            status.name,
            OutputFormatter::format_state(status.state),
            endpoint.if_supports_color(Stream::Stdout, |t| t.dimmed()),
            width = width
        );
        if verbose && !status.pids.is_empty() {
            let pids: Vec<String> = status.pids.iter().map(u32::to_string).collect();
            line.push_str(&format!("  pid {}", pids.join(", ")));
        }
        println!("{line}");
    }

    let connected = statuses
        .iter()
        .filter(|s| s.state == TunnelState::Connected)
        .count();
    println!(
        "{}",
        OutputFormatter::format_summary(statuses.len(), "connected", connected, 0)
    );

    Ok(statuses)
}
