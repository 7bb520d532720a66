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

//! End-to-end tests of the proxy commands against a fake process table.
//!
//! The fake records every launch and signal, so these tests observe exactly
//! which processes a real run would start or kill.

use async_trait::async_trait;
use serial_test::serial;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use socksies::app::dispatch_command;
use socksies::cli::Commands;
use socksies::commands::{
    collect_status, connect_proxy, disconnect_all, disconnect_proxy, proxy_details,
    ConnectOutcome,
};
use socksies::error::{
    exit_code_for, EXIT_CODE_LAUNCH, EXIT_CODE_NOT_FOUND, EXIT_CODE_SIGNAL,
};
use socksies::tunnel::{LaunchOutcome, ProcessControl, TunnelCommand, TunnelState};
use socksies::{ProxyError, ProxyTable};

const THREE_PROXIES: &str = r#"
jump1:
  host: 10.0.0.1
  port: 9051
  identity_file: /keys/jump1
jump2:
  host: 10.0.0.10
  port: 9052
  identity_file: /keys/jump2
edge:
  host: edge.example.com
  port: 1080
  identity_file: /keys/edge
"#;

/// Process table stand-in keyed by the exact match pattern of each tunnel.
#[derive(Default)]
struct FakeProcesses {
    running: Mutex<HashMap<String, Vec<u32>>>,
    launches: Mutex<Vec<TunnelCommand>>,
    finds: Mutex<Vec<String>>,
    signals: Mutex<Vec<String>>,
    launch_fails: bool,
    broken_signal: Option<String>,
    next_pid: Mutex<u32>,
}

impl FakeProcesses {
    fn failing_launch() -> Self {
        Self {
            launch_fails: true,
            ..Default::default()
        }
    }

    /// Signalling any pattern containing `fragment` fails.
    fn broken_signal_for(fragment: &str) -> Self {
        Self {
            broken_signal: Some(fragment.to_string()),
            ..Default::default()
        }
    }

    fn mark_running(&self, table: &ProxyTable, name: &str, pid: u32) {
        let proxy = table.get(name).unwrap();
        let pattern = TunnelCommand::for_proxy("ssh", proxy).match_pattern();
        self.running.lock().unwrap().insert(pattern, vec![pid]);
    }

    fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    fn signal_count(&self) -> usize {
        self.signals.lock().unwrap().len()
    }

    fn call_count(&self) -> usize {
        self.launch_count() + self.signal_count() + self.finds.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessControl for FakeProcesses {
    async fn launch(&self, command: &TunnelCommand) -> Result<LaunchOutcome, ProxyError> {
        self.launches.lock().unwrap().push(command.clone());
        if self.launch_fails {
            return Ok(LaunchOutcome {
                success: false,
                status: "exit status: 255".to_string(),
            });
        }

        let mut next_pid = self.next_pid.lock().unwrap();
        *next_pid += 1;
        let pid = 4000 + *next_pid;
        self.running
            .lock()
            .unwrap()
            .insert(command.match_pattern(), vec![pid]);
        Ok(LaunchOutcome {
            success: true,
            status: "exit status: 0".to_string(),
        })
    }

    async fn find(&self, pattern: &str) -> Result<Vec<u32>, ProxyError> {
        self.finds.lock().unwrap().push(pattern.to_string());
        Ok(self
            .running
            .lock()
            .unwrap()
            .get(pattern)
            .cloned()
            .unwrap_or_default())
    }

    async fn signal(&self, pattern: &str) -> Result<bool, ProxyError> {
        self.signals.lock().unwrap().push(pattern.to_string());
        if let Some(fragment) = &self.broken_signal {
            if pattern.contains(fragment.as_str()) {
                return Err(ProxyError::SubprocessSignalFailed {
                    program: "pkill".to_string(),
                    reason: "exit status: 3".to_string(),
                });
            }
        }
        Ok(self.running.lock().unwrap().remove(pattern).is_some())
    }
}

fn table(yaml: &str) -> ProxyTable {
    ProxyTable::parse(Path::new("proxy-config.yml"), yaml).unwrap()
}

#[tokio::test]
async fn test_jump1_lifecycle() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::default();

    let outcome = connect_proxy(&table, "jump1", &processes).await.unwrap();
    assert_eq!(outcome, ConnectOutcome::Established);
    {
        let launches = processes.launches.lock().unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(
            launches[0].command_line(),
            "ssh -D 9051 -i /keys/jump1 -q -C -f -N 10.0.0.1"
        );
    }

    let statuses = collect_status(&table, &processes).await.unwrap();
    let states: Vec<(&str, TunnelState)> = statuses
        .iter()
        .map(|s| (s.name.as_str(), s.state))
        .collect();
    assert_eq!(
        states,
        vec![
            ("jump1", TunnelState::Connected),
            ("jump2", TunnelState::Disconnected),
            ("edge", TunnelState::Disconnected),
        ]
    );
    assert_eq!(statuses[0].pids, vec![4001]);
    assert!(statuses[1].pids.is_empty());

    // A second connect must not stack another ssh on the same port.
    let outcome = connect_proxy(&table, "jump1", &processes).await.unwrap();
    assert_eq!(
        outcome,
        ConnectOutcome::AlreadyConnected { pids: vec![4001] }
    );
    assert_eq!(processes.launch_count(), 1);

    assert!(disconnect_proxy(&table, "jump1", &processes).await.unwrap());
    let statuses = collect_status(&table, &processes).await.unwrap();
    assert!(statuses
        .iter()
        .all(|s| s.state == TunnelState::Disconnected));

    // Disconnecting an idle proxy is not an error.
    assert!(!disconnect_proxy(&table, "jump1", &processes).await.unwrap());
}

#[tokio::test]
async fn test_overlapping_hosts_are_tracked_separately() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::default();

    connect_proxy(&table, "jump2", &processes).await.unwrap();
    let statuses = collect_status(&table, &processes).await.unwrap();
    assert_eq!(statuses[0].state, TunnelState::Disconnected);
    assert_eq!(statuses[1].state, TunnelState::Connected);

    // jump1 (10.0.0.1) is a prefix of jump2 (10.0.0.10) and must not kill it.
    assert!(!disconnect_proxy(&table, "jump1", &processes).await.unwrap());
    let statuses = collect_status(&table, &processes).await.unwrap();
    assert_eq!(statuses[1].state, TunnelState::Connected);
}

#[tokio::test]
async fn test_connect_failure_maps_to_launch_exit_code() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::failing_launch();

    let err = connect_proxy(&table, "edge", &processes).await.unwrap_err();
    match &err {
        ProxyError::ConnectFailed { proxy, status } => {
            assert_eq!(proxy, "edge");
            assert_eq!(status, "exit status: 255");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = dispatch_command(
        &Commands::Connect {
            proxy_name: "edge".to_string(),
        },
        &table,
        &processes,
    )
    .await
    .unwrap_err();
    assert_eq!(exit_code_for(&err), EXIT_CODE_LAUNCH);
}

#[tokio::test]
async fn test_unknown_proxy_touches_no_process() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::default();

    for command in [
        Commands::Info {
            proxy_name: "ghost".to_string(),
        },
        Commands::Connect {
            proxy_name: "ghost".to_string(),
        },
        Commands::Disconnect {
            proxy_name: "ghost".to_string(),
        },
    ] {
        let err = dispatch_command(&command, &table, &processes)
            .await
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_CODE_NOT_FOUND, "{command:?}");
    }

    assert_eq!(processes.call_count(), 0);
}

#[tokio::test]
async fn test_info_never_spawns() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::default();

    let details = proxy_details(&table, "edge", processes.ssh_program()).unwrap();
    assert!(details.contains(&(
        "SSH Command",
        "ssh -D 1080 -i /keys/edge -q -C -f -N edge.example.com".to_string()
    )));

    dispatch_command(
        &Commands::Info {
            proxy_name: "edge".to_string(),
        },
        &table,
        &processes,
    )
    .await
    .unwrap();
    assert_eq!(processes.call_count(), 0);
}

#[tokio::test]
async fn test_incomplete_entry_cannot_connect() {
    let yaml = "half:\n  host: 10.0.0.9\n  identity_file: /k\n";
    let table = table(yaml);
    let processes = FakeProcesses::default();

    let err = connect_proxy(&table, "half", &processes).await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::ProxyFieldMissing { field: "port", .. }
    ));
    assert_eq!(processes.call_count(), 0);
}

#[tokio::test]
async fn test_disconnect_all_signals_every_proxy() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::default();
    processes.mark_running(&table, "jump2", 777);

    let summary = disconnect_all(&table, &processes).await.unwrap();
    assert_eq!(processes.signal_count(), 3);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.stopped, vec!["jump2".to_string()]);
    assert_eq!(
        summary.not_running,
        vec!["jump1".to_string(), "edge".to_string()]
    );
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_disconnect_all_with_nothing_running_succeeds() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::default();

    let summary = disconnect_all(&table, &processes).await.unwrap();
    assert!(summary.stopped.is_empty());
    assert_eq!(summary.not_running.len(), 3);

    dispatch_command(
        &Commands::Disconnect {
            proxy_name: "all".to_string(),
        },
        &table,
        &processes,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_disconnect_all_continues_past_failures() {
    let table = table(THREE_PROXIES);
    let processes = FakeProcesses::broken_signal_for("9051");
    processes.mark_running(&table, "edge", 900);

    let err = disconnect_all(&table, &processes).await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::DisconnectAllFailed {
            failed: 1,
            total: 3
        }
    ));
    // edge comes after the failing jump1 and must still be stopped.
    assert_eq!(processes.signal_count(), 3);
    assert!(processes.running.lock().unwrap().is_empty());

    let processes = FakeProcesses::broken_signal_for("9051");
    let err = dispatch_command(
        &Commands::Disconnect {
            proxy_name: "all".to_string(),
        },
        &table,
        &processes,
    )
    .await
    .unwrap_err();
    assert_eq!(exit_code_for(&err), EXIT_CODE_SIGNAL);
}

#[tokio::test]
async fn test_status_of_empty_table() {
    let table = table("");
    let processes = FakeProcesses::default();

    let statuses = collect_status(&table, &processes).await.unwrap();
    assert!(statuses.is_empty());
    dispatch_command(&Commands::Status { verbose: true }, &table, &processes)
        .await
        .unwrap();
    assert_eq!(processes.call_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_connect_uses_expanded_identity_file() {
    let original_home = std::env::var("HOME").ok();
    std::env::set_var("HOME", "/home/tunnel");
    let table = table("home:\n  host: h.example\n  port: 1081\n  identity_file: ~/.ssh/id_ed25519\n");
    match original_home {
        Some(home) => std::env::set_var("HOME", home),
        None => std::env::remove_var("HOME"),
    }

    let processes = FakeProcesses::default();
    connect_proxy(&table, "home", &processes).await.unwrap();

    let launches = processes.launches.lock().unwrap();
    assert_eq!(
        launches[0].args(),
        &[
            "-D",
            "1081",
            "-i",
            "/home/tunnel/.ssh/id_ed25519",
            "-q",
            "-C",
            "-f",
            "-N",
            "h.example"
        ]
    );
}
