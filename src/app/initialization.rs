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

//! Application initialization and configuration loading

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::Cli;
use crate::config::ProxyTable;
use crate::tunnel::{SystemProcessControl, ToolPaths};

/// Application context after initialization
pub struct AppContext {
    pub table: ProxyTable,
    pub control: SystemProcessControl,
}

/// Load the proxy table and build the process controller.
///
/// An explicit `--config` (or `SOCKSIES_CONFIG`) path is used as is; otherwise
/// the default locations are searched in priority order.
pub async fn initialize_app(cli: &Cli) -> Result<AppContext> {
    let table = ProxyTable::load_with_priority(cli.config_path())
        .await
        .context("Failed to load proxy configuration")?;

    debug!(
        "Loaded {} proxies ({} invalid) from {}",
        table.len(),
        table.invalid().len(),
        table.path().display()
    );

    let control = SystemProcessControl::new(ToolPaths::default()).with_timeout_secs(cli.timeout);

    Ok(AppContext { table, control })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{exit_code_for, EXIT_CODE_CONFIG};
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_initialize_with_explicit_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "p:\n  host: h\n  port: 1080\n  identity_file: /k").unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["socksies", "--config", &path, "--timeout", "5", "list"])
            .unwrap();
        let ctx = initialize_app(&cli).await.unwrap();

        assert_eq!(ctx.table.len(), 1);
        assert_eq!(ctx.table.path(), file.path());
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        let path = path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["socksies", "--config", &path, "list"]).unwrap();

        let err = initialize_app(&cli).await.err().unwrap();
        assert_eq!(exit_code_for(&err), EXIT_CODE_CONFIG);
    }
}
