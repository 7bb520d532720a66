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

//! SSH dynamic-forward command construction.
//!
//! The command line `connect` launches is also the identifying fragment that
//! `status` and `disconnect` search the process table for, so both are built
//! here from one argument vector.

use std::fmt;

use crate::config::ProxyConfig;

/// Characters with special meaning in POSIX extended regular expressions,
/// which is what `pgrep -f` and `pkill -f` compile their pattern as.
const ERE_METACHARACTERS: &[char] = &[
    '\\', '.', '[', ']', '(', ')', '*', '+', '?', '{', '}', '|', '^', '$',
];

/// The `ssh` invocation that provides one proxy's SOCKS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelCommand {
    proxy: String,
    program: String,
    args: Vec<String>,
}

impl TunnelCommand {
    /// Build `ssh -D <port> -i <identity_file> -q -C -f -N <host>`.
    ///
    /// `-f` backgrounds ssh after authentication and `-N` skips the remote
    /// command, so the launching process returns once the tunnel is up.
    pub fn for_proxy(ssh_program: &str, proxy: &ProxyConfig) -> Self {
        let args = vec![
            "-D".to_string(),
            proxy.port.to_string(),
            "-i".to_string(),
            proxy.identity_file.to_string_lossy().into_owned(),
            "-q".to_string(),
            "-C".to_string(),
            "-f".to_string(),
            "-N".to_string(),
            proxy.host.clone(),
        ];

        Self {
            proxy: proxy.name.clone(),
            program: ssh_program.to_string(),
            args,
        }
    }

    /// Name of the proxy this command serves.
    pub fn proxy(&self) -> &str {
        &self.proxy
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Command line as the process table reports it: argv joined by spaces.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Command line quoted for pasting into a shell.
    pub fn shell_display(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }

    /// `pgrep`/`pkill` pattern matching exactly this tunnel.
    ///
    /// The command line is escaped literally and anchored at the end so a
    /// tunnel to `10.0.0.1` never matches one to `10.0.0.10`.
    pub fn match_pattern(&self) -> String {
        let mut pattern = escape_ere(&self.command_line());
        pattern.push('$');
        pattern
    }
}

impl fmt::Display for TunnelCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shell_display())
    }
}

/// Escape a literal string for use in a POSIX extended regular expression.
pub fn escape_ere(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len() + 8);
    for ch in literal.chars() {
        if ERE_METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
