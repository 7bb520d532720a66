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

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::CONFIG_ENV_VAR;
use crate::tunnel::DEFAULT_TIMEOUT_SECS;

#[derive(Parser, Debug)]
#[command(
    name = "socksies",
    version,
    about = "Manage SSH-based SOCKS proxy tunnels",
    long_about = "socksies starts, stops and inspects SSH dynamic-forward tunnels (ssh -D) defined in a YAML file.\nEach named proxy maps to a host, a local SOCKS port and an identity file.\nTunnel state is read from the process table on every run; nothing is cached between invocations.",
    after_help = "EXAMPLES:\n  List configured proxies:   socksies list\n  Start a tunnel:            socksies connect jump1\n  Show tunnel state:         socksies status --verbose\n  Stop every tunnel:         socksies disconnect all\n\nConfig loading priority:\n  1. --config / SOCKSIES_CONFIG\n  2. proxy-config.yml next to the executable\n  3. ~/.config/socksies/proxy-config.yml"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        long,
        global = true,
        env = CONFIG_ENV_VAR,
        value_parser = parse_config_path,
        help = "Proxy configuration file (no fallback when given; an empty value means unset)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout in seconds for ssh, pgrep and pkill (0 for unlimited)\nFor ssh this includes any passphrase or host key prompt before it backgrounds;\nuse --timeout 0 when authentication is interactive and slow"
    )]
    pub timeout: u64,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

impl Cli {
    /// Explicit configuration path, if one was given and is not empty.
    pub fn config_path(&self) -> Option<&Path> {
        self.config
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Accepts empty input so an empty `SOCKSIES_CONFIG` falls back to the
/// default search instead of failing argument parsing.
fn parse_config_path(value: &str) -> Result<PathBuf, String> {
    Ok(PathBuf::from(value))
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(
        visible_alias = "l",
        about = "List configured proxies",
        long_about = "Prints one line per usable proxy as 'name (host:port)', in file order.\nEntries that fail validation are reported on stderr."
    )]
    List,

    #[command(
        visible_alias = "i",
        about = "Show the configuration of one proxy",
        long_about = "Shows host, port and identity file of a proxy together with the ssh command `connect` would run.\nNo process is started or inspected."
    )]
    Info {
        #[arg(help = "Name of the proxy")]
        proxy_name: String,
    },

    #[command(
        visible_alias = "c",
        about = "Start the SOCKS tunnel of a proxy",
        long_about = "Runs ssh -D <port> -i <identity_file> -q -C -f -N <host>.\nDoes nothing if a matching tunnel is already running.\n\nExit codes: 0 (connected), 3 (unknown proxy), 4 (ssh failed), 124 (timed out)"
    )]
    Connect {
        #[arg(help = "Name of the proxy")]
        proxy_name: String,
    },

    #[command(
        visible_alias = "d",
        about = "Stop the SOCKS tunnel of a proxy, or 'all'",
        long_about = "Signals the ssh process of a proxy with pkill.\nWith 'all', every configured proxy is attempted even if some fail.\n\nExit codes: 0 (done, including nothing to stop), 3 (unknown proxy), 5 (signal failed)"
    )]
    Disconnect {
        #[arg(help = "Name of the proxy, or 'all'")]
        proxy_name: String,
    },

    #[command(
        visible_alias = "s",
        about = "Show which proxies are connected"
    )]
    Status {
        #[arg(short = 'v', long, help = "Show the PIDs of running tunnels")]
        verbose: bool,
    },
}
