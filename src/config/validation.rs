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

//! Per-entry validation of proxy definitions.
//!
//! A bad entry never fails the document. It is recorded as an
//! [`InvalidProxy`] and the remaining entries load normally.

use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

use super::types::{InvalidProxy, ProxyConfig, ProxyTable, RawProxyEntry, ALL_PROXIES};
use super::utils::expand_tilde;
use crate::error::ProxyError;

impl ProxyTable {
    /// Build a table from YAML text.
    ///
    /// `path` is only used for error messages and [`ProxyTable::path`].
    pub fn parse(path: &Path, content: &str) -> Result<Self, ProxyError> {
        let document: Value =
            serde_yaml::from_str(content).map_err(|e| ProxyError::ConfigMalformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mapping = match document {
            Value::Null => {
                tracing::debug!("Configuration file {} is empty", path.display());
                return Ok(Self {
                    path: path.to_path_buf(),
                    ..Self::default()
                });
            }
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(ProxyError::ConfigMalformed {
                    path: path.to_path_buf(),
                    reason: format!(
                        "expected a mapping of proxy names to definitions, found {}",
                        value_kind(&other)
                    ),
                })
            }
        };

        let mut table = Self {
            path: path.to_path_buf(),
            ..Self::default()
        };
        let mut ports: HashMap<u16, String> = HashMap::new();

        for (key, value) in mapping {
            let name = proxy_name(&key).ok_or_else(|| ProxyError::ConfigMalformed {
                path: path.to_path_buf(),
                reason: format!(
                    "proxy names must be strings, found {}",
                    value_kind(&key)
                ),
            })?;

            if name == ALL_PROXIES {
                tracing::warn!(
                    proxy = %name,
                    "Proxy name '{}' is reserved by 'disconnect all' and cannot be disconnected on its own",
                    ALL_PROXIES
                );
            }

            match validate_entry(&name, value) {
                Ok(proxy) => {
                    if let Some(owner) = ports.get(&proxy.port) {
                        tracing::debug!(proxy = %name, port = proxy.port, "Duplicate proxy port");
                        table.invalid.push(InvalidProxy::invalid(
                            &name,
                            "port",
                            format!("port {} is already used by proxy '{owner}'", proxy.port),
                        ));
                        continue;
                    }
                    ports.insert(proxy.port, proxy.name.clone());
                    table.proxies.push(proxy);
                }
                Err(invalid) => {
                    tracing::debug!(proxy = %name, field = invalid.field, "Invalid proxy entry");
                    table.invalid.push(invalid);
                }
            }
        }

        Ok(table)
    }
}

fn proxy_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Validate one entry, reporting the first problem in field order.
pub(super) fn validate_entry(name: &str, value: Value) -> Result<ProxyConfig, InvalidProxy> {
    if !value.is_mapping() {
        return Err(InvalidProxy::invalid(
            name,
            "definition",
            format!(
                "expected a mapping with host, port and identity_file, found {}",
                value_kind(&value)
            ),
        ));
    }

    let raw: RawProxyEntry = serde_yaml::from_value(value)
        .map_err(|e| InvalidProxy::invalid(name, "definition", e.to_string()))?;

    for key in raw.extra.keys() {
        tracing::warn!(proxy = %name, "Ignoring unknown field '{}'", key);
    }

    let host = required_string(name, "host", raw.host)?;
    let port = required_port(name, raw.port)?;
    let identity_file_raw = required_string(name, "identity_file", raw.identity_file)?;
    let identity_file = expand_tilde(&identity_file_raw);

    Ok(ProxyConfig {
        name: name.to_string(),
        host,
        port,
        identity_file,
        identity_file_raw,
    })
}

fn required_string(
    name: &str,
    field: &'static str,
    value: Option<Value>,
) -> Result<String, InvalidProxy> {
    match value {
        None | Some(Value::Null) => Err(InvalidProxy::missing(name, field)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(InvalidProxy::missing(name, field))
            } else if trimmed.chars().any(char::is_control) {
                Err(InvalidProxy::invalid(
                    name,
                    field,
                    "contains control characters",
                ))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(other) => Err(InvalidProxy::invalid(
            name,
            field,
            format!("expected a string, found {}", value_kind(&other)),
        )),
    }
}

fn required_port(name: &str, value: Option<Value>) -> Result<u16, InvalidProxy> {
    match value {
        None | Some(Value::Null) => Err(InvalidProxy::missing(name, "port")),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(port) if (1..=u64::from(u16::MAX)).contains(&port) => Ok(port as u16),
            _ => Err(InvalidProxy::invalid(
                name,
                "port",
                format!("{n} is not a port number between 1 and 65535"),
            )),
        },
        Some(other) => Err(InvalidProxy::invalid(
            name,
            "port",
            format!("expected an integer, found {}", value_kind(&other)),
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
