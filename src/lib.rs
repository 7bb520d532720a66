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

//! Manage SSH-based SOCKS proxy tunnels defined in a YAML file.
//!
//! Each configured proxy is an `ssh -D <port> ... -f -N <host>` process. The
//! crate never records which tunnels it started: connection state is always
//! derived from the process table through [`tunnel::ProcessControl`].

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod tunnel;
pub mod ui;
pub mod utils;

pub use config::{ProxyConfig, ProxyTable};
pub use error::{exit_code_for, ProxyError};
pub use tunnel::{ProcessControl, SystemProcessControl, TunnelCommand, TunnelState};
