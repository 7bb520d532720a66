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
use std::io::{self, Write};

use crate::config::{ProxyConfig, ProxyTable};
use crate::ui::{report_invalid, should_use_colors};

fn format_proxy_line(proxy: &ProxyConfig, colors: bool) -> String {
    if colors {
        format!(
            "{} {}",
            proxy.name.bold(),
            format!("({})", proxy.endpoint()).dimmed()
        )
    } else {
        proxy.to_string()
    }
}

/// One `name (host:port)` line per usable proxy, in file order.
pub fn proxy_lines(table: &ProxyTable, colors: bool) -> impl Iterator<Item = String> + '_ {
    table
        .proxies()
        .iter()
        .map(move |proxy| format_proxy_line(proxy, colors))
}

/// Write the proxy list to `out`, returning the number of lines written.
pub fn write_proxy_list<W: Write>(table: &ProxyTable, out: &mut W, colors: bool) -> io::Result<usize> {
    let mut written = 0;
    for line in proxy_lines(table, colors) {
        writeln!(out, "{line}")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Print exactly one stdout line per usable proxy.
///
/// Invalid entries and the empty case are reported on stderr so the output
/// stays pipe-friendly.
pub fn list_proxies(table: &ProxyTable) -> io::Result<()> {
    report_invalid(table);

    if table.is_empty() {
        let message = format!("No proxies configured in {}", table.path().display());
        eprintln!(
            "{}",
            message.if_supports_color(Stream::Stderr, |t| t.dimmed())
        );
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_proxy_list(table, &mut out, should_use_colors())?;
    Ok(())
}
