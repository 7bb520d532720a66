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

//! Proxy configuration management.
//!
//! The configuration file is a flat YAML mapping of proxy names to
//! definitions:
//!
//! ```yaml
//! jump1:
//!   host: 10.0.0.1
//!   port: 9051
//!   identity_file: ~/.ssh/jump_key
//! ```

mod loader;
#[cfg(test)]
mod tests;
mod types;
mod utils;
mod validation;

pub use loader::default_config_candidates;
pub use types::{
    InvalidProxy, ProxyConfig, ProxyTable, ALL_PROXIES, CONFIG_ENV_VAR, CONFIG_FILE_NAME,
};
pub use utils::{expand_tilde, expand_tilde_path, home_dir};
