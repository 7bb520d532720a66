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

//! Configuration tests.

use serial_test::serial;
use std::path::{Path, PathBuf};

use super::types::ProxyTable;
use super::utils::expand_tilde;
use crate::error::ProxyError;

const SAMPLE: &str = r#"
proxy1:
  host: 172.31.0.51
  port: 9051
  identity_file: ~/.ssh/private_key

proxy2:
  host: bastion.example.com
  port: 9052
  identity_file: /etc/socksies/bastion_key
"#;

fn with_home<T>(home: &str, f: impl FnOnce() -> T) -> T {
    let original_home = std::env::var("HOME").ok();
    std::env::set_var("HOME", home);
    let result = f();
    match original_home {
        Some(home) => std::env::set_var("HOME", home),
        None => std::env::remove_var("HOME"),
    }
    result
}

#[test]
#[serial]
fn test_expand_tilde() {
    with_home("/home/user", || {
        assert_eq!(
            expand_tilde("~/.ssh/config"),
            PathBuf::from("/home/user/.ssh/config")
        );
        assert_eq!(expand_tilde("~"), PathBuf::from("/home/user"));
        assert_eq!(expand_tilde("/abs/key"), PathBuf::from("/abs/key"));
        assert_eq!(expand_tilde("~other/key"), PathBuf::from("~other/key"));
        assert_eq!(expand_tilde("relative/~/key"), PathBuf::from("relative/~/key"));
    });
}

#[test]
#[serial]
fn test_sample_config_parsing() {
    let table = with_home("/home/user", || {
        ProxyTable::parse(Path::new("proxy-config.yml"), SAMPLE).unwrap()
    });

    assert_eq!(table.len(), 2);
    assert!(table.invalid().is_empty());
    assert_eq!(table.names().collect::<Vec<_>>(), vec!["proxy1", "proxy2"]);

    let proxy = table.get("proxy1").unwrap();
    assert_eq!(proxy.host, "172.31.0.51");
    assert_eq!(proxy.port, 9051);
    assert_eq!(proxy.identity_file_raw, "~/.ssh/private_key");
    assert_eq!(
        proxy.identity_file,
        PathBuf::from("/home/user/.ssh/private_key")
    );
    assert_eq!(proxy.endpoint(), "172.31.0.51:9051");
    assert_eq!(proxy.to_string(), "proxy1 (172.31.0.51:9051)");
}

#[test]
#[serial]
fn test_file_order_is_preserved() {
    let yaml = "zeta:\n  host: z\n  port: 1\n  identity_file: k\nalpha:\n  host: a\n  port: 2\n  identity_file: k\n";
    let table = ProxyTable::parse(Path::new("c.yml"), yaml).unwrap();
    assert_eq!(table.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
}

#[test]
#[serial]
fn test_proxy_not_found() {
    let table = ProxyTable::parse(Path::new("proxy-config.yml"), SAMPLE).unwrap();
    match table.get("nonexistent") {
        Err(ProxyError::ProxyNotFound { name, config }) => {
            assert_eq!(name, "nonexistent");
            assert_eq!(config, PathBuf::from("proxy-config.yml"));
        }
        other => panic!("expected ProxyNotFound, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_missing_port_keeps_other_entries() {
    let yaml = r#"
good1:
  host: 10.0.0.1
  port: 9051
  identity_file: /k1
broken:
  host: 10.0.0.2
  identity_file: /k2
good2:
  host: 10.0.0.3
  port: 9053
  identity_file: /k3
"#;
    let table = ProxyTable::parse(Path::new("c.yml"), yaml).unwrap();

    assert_eq!(table.names().collect::<Vec<_>>(), vec!["good1", "good2"]);
    assert_eq!(table.invalid().len(), 1);
    assert_eq!(table.invalid()[0].name, "broken");
    assert_eq!(table.invalid()[0].field, "port");

    match table.get("broken") {
        Err(err @ ProxyError::ProxyFieldMissing { .. }) => {
            assert_eq!(err.to_string(), "proxy 'broken' is missing required field 'port'");
            assert!(err.is_config_error());
        }
        other => panic!("expected ProxyFieldMissing, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_duplicate_port_is_rejected() {
    let yaml = r#"
first:
  host: a
  port: 9051
  identity_file: /k
second:
  host: b
  port: 9051
  identity_file: /k
"#;
    let table = ProxyTable::parse(Path::new("c.yml"), yaml).unwrap();
    assert_eq!(table.names().collect::<Vec<_>>(), vec!["first"]);

    match table.get("second") {
        Err(ProxyError::ProxyFieldInvalid { field, reason, .. }) => {
            assert_eq!(field, "port");
            assert!(reason.contains("'first'"), "reason was {reason}");
        }
        other => panic!("expected ProxyFieldInvalid, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_empty_document_is_empty_table() {
    let table = ProxyTable::parse(Path::new("c.yml"), "").unwrap();
    assert!(table.is_empty());

    let table = ProxyTable::parse(Path::new("c.yml"), "# only a comment\n").unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn test_malformed_documents() {
    for yaml in ["- a\n- b\n", "just text", "key: [unclosed\n", "[1, 2]: {}\n"] {
        match ProxyTable::parse(Path::new("c.yml"), yaml) {
            Err(ProxyError::ConfigMalformed { path, .. }) => {
                assert_eq!(path, PathBuf::from("c.yml"));
            }
            other => panic!("expected ConfigMalformed for {yaml:?}, got {other:?}"),
        }
    }
}

#[test]
#[serial]
fn test_numeric_proxy_name() {
    let yaml = "42:\n  host: h\n  port: 4242\n  identity_file: /k\n";
    let table = ProxyTable::parse(Path::new("c.yml"), yaml).unwrap();
    assert!(table.get("42").is_ok());
}

#[tokio::test]
#[serial]
async fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proxy-config.yml");
    tokio::fs::write(&path, SAMPLE).await.unwrap();

    let table = ProxyTable::load(&path).await.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.path(), path.as_path());
}

#[tokio::test]
#[serial]
async fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");

    match ProxyTable::load(&path).await {
        Err(ProxyError::ConfigNotFound { searched }) => assert_eq!(searched, vec![path]),
        other => panic!("expected ConfigNotFound, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_explicit_path_has_no_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");

    let err = ProxyTable::load_with_priority(Some(&path))
        .await
        .unwrap_err();
    assert!(matches!(err, ProxyError::ConfigNotFound { .. }));
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn test_load_directory_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();

    let err = ProxyTable::load(dir.path()).await.unwrap_err();
    assert!(
        matches!(err, ProxyError::ConfigUnreadable { .. }),
        "got {err:?}"
    );
}
