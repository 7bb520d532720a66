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

//! Configuration utility functions.

use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Current user's home directory.
///
/// `HOME` wins so tests and wrappers can redirect it; the platform lookup is
/// the fallback.
pub fn home_dir() -> Option<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
    }
}

/// Expand a leading `~` or `~/` to the home directory.
///
/// `~user` forms are left untouched, as is everything when no home
/// directory can be determined.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// [`expand_tilde`] for paths that may not be valid UTF-8.
pub fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(path_str) => expand_tilde(path_str),
        None => path.to_path_buf(),
    }
}
