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

use tracing_subscriber::EnvFilter;

/// Create an environment filter based on verbosity level
pub fn create_env_filter(verbosity: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbosity {
            0 => EnvFilter::new("socksies=warn"),
            1 => EnvFilter::new("socksies=info"),
            2 => EnvFilter::new("socksies=debug"),
            _ => EnvFilter::new("socksies=trace"),
        }
    }
}

/// Initialize console logging on stderr.
///
/// Stdout carries command output (`list` in particular is meant to be piped),
/// so log lines never go there. Calling this twice is a no-op.
pub fn init_logging(verbosity: u8) {
    use std::io::IsTerminal;

    let filter = create_env_filter(verbosity);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none())
        .with_writer(std::io::stderr)
        .try_init();
}
