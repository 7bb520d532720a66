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

//! Configuration loading and priority management.

use directories::ProjectDirs;
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::{ProxyTable, CONFIG_FILE_NAME};
use super::utils::expand_tilde_path;
use crate::error::ProxyError;

impl ProxyTable {
    /// Load proxies from a specific file.
    pub async fn load(path: &Path) -> Result<Self, ProxyError> {
        let expanded_path = expand_tilde_path(path);

        let content = match fs::read_to_string(&expanded_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProxyError::ConfigNotFound {
                    searched: vec![expanded_path],
                })
            }
            Err(source) => {
                return Err(ProxyError::ConfigUnreadable {
                    path: expanded_path,
                    source,
                })
            }
        };

        let table = Self::parse(&expanded_path, &content)?;
        tracing::debug!(
            path = %expanded_path.display(),
            proxies = table.len(),
            invalid = table.invalid().len(),
            "Loaded proxy configuration"
        );
        Ok(table)
    }

    /// Load proxies with priority order:
    /// 1. Explicit path (`--config` or `SOCKSIES_CONFIG`)
    /// 2. `proxy-config.yml` next to the executable (symlinks resolved)
    /// 3. XDG config directory (`$XDG_CONFIG_HOME/socksies/proxy-config.yml`
    ///    or the platform equivalent)
    ///
    /// An explicit path is never silently replaced by a fallback.
    pub async fn load_with_priority(explicit: Option<&Path>) -> Result<Self, ProxyError> {
        if let Some(path) = explicit {
            tracing::debug!("Using explicitly specified config file: {:?}", path);
            return Self::load(path).await;
        }

        let candidates = default_config_candidates();
        for candidate in &candidates {
            tracing::debug!("Checking config path: {:?}", candidate);
            if fs::try_exists(candidate).await.unwrap_or(false) {
                return Self::load(candidate).await;
            }
        }

        Err(ProxyError::ConfigNotFound {
            searched: candidates,
        })
    }
}

/// Default configuration locations, highest priority first.
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = executable_dir() {
        candidates.push(dir.join(CONFIG_FILE_NAME));
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILE_NAME);
        if !candidates.contains(&path) {
            candidates.push(path);
        }
    }

    candidates
}

/// Directory holding the real executable, following symlinks so a linked
/// binary still finds the file installed beside it.
fn executable_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let resolved = std::fs::canonicalize(&exe).unwrap_or(exe);
    resolved.parent().map(Path::to_path_buf)
}

fn xdg_config_dir() -> Option<PathBuf> {
    match env::var_os("XDG_CONFIG_HOME") {
        Some(xdg_config_home) if !xdg_config_home.is_empty() => {
            Some(PathBuf::from(xdg_config_home).join("socksies"))
        }
        _ => ProjectDirs::from("", "", "socksies").map(|dirs| dirs.config_dir().to_path_buf()),
    }
}
