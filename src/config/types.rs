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

//! Configuration type definitions.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProxyError;

/// Fixed name of the proxy definition file.
pub const CONFIG_FILE_NAME: &str = "proxy-config.yml";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "SOCKSIES_CONFIG";

/// Argument to `disconnect` that targets every configured proxy.
pub const ALL_PROXIES: &str = "all";

/// A fully validated proxy definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub name: String,
    pub host: String,
    /// Local SOCKS listen port, passed to `ssh -D`.
    pub port: u16,
    /// Identity file with `~` expanded.
    pub identity_file: PathBuf,
    /// Identity file exactly as written in the configuration.
    pub identity_file_raw: String,
}

impl ProxyConfig {
    /// `host:port` label used in listings.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// A proxy entry that failed validation.
///
/// `reason` is `None` when the field is absent and `Some` when it is present
/// with an unusable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProxy {
    pub name: String,
    pub field: &'static str,
    pub reason: Option<String>,
}

impl InvalidProxy {
    pub(super) fn missing(name: &str, field: &'static str) -> Self {
        Self {
            name: name.to_string(),
            field,
            reason: None,
        }
    }

    pub(super) fn invalid(name: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            field,
            reason: Some(reason.into()),
        }
    }

    /// The error a command reports when it needs this entry.
    pub fn to_error(&self) -> ProxyError {
        match &self.reason {
            None => ProxyError::ProxyFieldMissing {
                proxy: self.name.clone(),
                field: self.field,
            },
            Some(reason) => ProxyError::ProxyFieldInvalid {
                proxy: self.name.clone(),
                field: self.field,
                reason: reason.clone(),
            },
        }
    }
}

/// All proxies read from one configuration file, in file order.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    pub(super) path: PathBuf,
    pub(super) proxies: Vec<ProxyConfig>,
    pub(super) invalid: Vec<InvalidProxy>,
}

impl ProxyTable {
    /// Path of the file this table was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Usable proxies.
    pub fn proxies(&self) -> &[ProxyConfig] {
        &self.proxies
    }

    /// Entries that failed validation.
    pub fn invalid(&self) -> &[InvalidProxy] {
        &self.invalid
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.proxies.iter().map(|p| p.name.as_str())
    }

    /// Look up a usable proxy by name.
    ///
    /// An entry that exists but failed validation yields its field error,
    /// an unknown name yields [`ProxyError::ProxyNotFound`].
    pub fn get(&self, name: &str) -> Result<&ProxyConfig, ProxyError> {
        if let Some(proxy) = self.proxies.iter().find(|p| p.name == name) {
            return Ok(proxy);
        }
        if let Some(invalid) = self.invalid.iter().find(|p| p.name == name) {
            return Err(invalid.to_error());
        }
        Err(ProxyError::ProxyNotFound {
            name: name.to_string(),
            config: self.path.clone(),
        })
    }
}

/// One proxy entry as it appears in YAML, before validation.
///
/// Fields stay untyped so a wrong type can be reported per entry instead of
/// failing the whole document.
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawProxyEntry {
    #[serde(default)]
    pub host: Option<serde_yaml::Value>,
    #[serde(default)]
    pub port: Option<serde_yaml::Value>,
    #[serde(default)]
    pub identity_file: Option<serde_yaml::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}
