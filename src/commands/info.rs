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

use owo_colors::{OwoColorize, Stream, Style};

use crate::config::ProxyTable;
use crate::error::ProxyError;
use crate::tunnel::TunnelCommand;

/// Labelled configuration values for one proxy.
///
/// Needs only the name of the ssh program, never a process handle, so looking
/// up a proxy cannot start anything.
pub fn proxy_details(
    table: &ProxyTable,
    name: &str,
    ssh_program: &str,
) -> Result<Vec<(&'static str, String)>, ProxyError> {
    let proxy = table.get(name)?;
    let command = TunnelCommand::for_proxy(ssh_program, proxy);

    let mut details = vec![
        ("Host", proxy.host.clone()),
        ("Port", proxy.port.to_string()),
        ("Identity File", proxy.identity_file_raw.clone()),
    ];
    let expanded = proxy.identity_file.display().to_string();
    if expanded != proxy.identity_file_raw {
        details.push(("Resolved Identity", expanded));
    }
    details.push(("SSH Command", command.shell_display()));

    Ok(details)
}

pub fn show_proxy_info(table: &ProxyTable, name: &str, ssh_program: &str) -> Result<(), ProxyError> {
    let details = proxy_details(table, name, ssh_program)?;

    let name_style = Style::new().bold().cyan();
    println!(
        "{} {}",
        "Proxy:".if_supports_color(Stream::Stdout, |t| t.bold()),
        name.if_supports_color(Stream::Stdout, |t| t.style(name_style))
    );
    let width = details.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in details {
        println!("  {:<width$}  {}", format!("{label}:"), value, width = width + 1);
    }

    Ok(())
}
