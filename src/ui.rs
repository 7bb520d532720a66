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

use crate::config::{InvalidProxy, ProxyTable};
use crate::tunnel::TunnelState;

const RULE_WIDTH: usize = 60;

/// Check if colors should be enabled
///
/// Colors are enabled when:
/// - stdout is a TTY
/// - NO_COLOR environment variable is not set
/// - TERM is not "dumb"
pub fn should_use_colors() -> bool {
    use std::io::IsTerminal;

    if !std::io::stdout().is_terminal() {
        return false;
    }

    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_section_header(title: &str) -> String {
        format!(
            "\n{} {}\n",
            "▶".if_supports_color(Stream::Stdout, |t| t.cyan()),
            title.if_supports_color(Stream::Stdout, |t| t.bold())
        )
    }

    pub fn format_state(state: TunnelState) -> String {
        match state {
            TunnelState::Connected => "● Connected"
                .if_supports_color(Stream::Stdout, |t| t.green())
                .to_string(),
            TunnelState::Disconnected => "○ Not running"
                .if_supports_color(Stream::Stdout, |t| t.dimmed())
                .to_string(),
        }
    }

    pub fn format_invalid(invalid: &InvalidProxy) -> String {
        let message = format!("⚠ skipping {}", invalid.to_error());
        message
            .if_supports_color(Stream::Stderr, |t| t.yellow())
            .to_string()
    }

    /// Summary line for commands that touch every proxy.
    pub fn format_summary(total: usize, label: &str, count: usize, failed: usize) -> String {
        let green_bold = Style::new().green().bold();
        let red_bold = Style::new().red().bold();
        let mut parts = Vec::new();

        parts.push(format!(
            "{} {}",
            total.if_supports_color(Stream::Stdout, |t| t.bold()),
            if total == 1 { "proxy" } else { "proxies" }
        ));

        if count > 0 {
            parts.push(format!(
                "{} {}",
                count.if_supports_color(Stream::Stdout, |t| t.style(green_bold)),
                label.if_supports_color(Stream::Stdout, |t| t.green())
            ));
        }

        if failed > 0 {
            parts.push(format!(
                "{} {}",
                failed.if_supports_color(Stream::Stdout, |t| t.style(red_bold)),
                "failed".if_supports_color(Stream::Stdout, |t| t.red())
            ));
        }

        let rule = "═".repeat(RULE_WIDTH);
        let summary = format!(" Summary: {} ", parts.join(" • "));
        format!(
            "\n{}\n{}\n{}",
            rule.if_supports_color(Stream::Stdout, |t| t.dimmed()),
            summary.if_supports_color(Stream::Stdout, |t| t.bold()),
            rule.if_supports_color(Stream::Stdout, |t| t.dimmed())
        )
    }
}

/// Warn on stderr about every entry that failed validation.
pub fn report_invalid(table: &ProxyTable) {
    for invalid in table.invalid() {
        eprintln!("{}", OutputFormatter::format_invalid(invalid));
    }
}
