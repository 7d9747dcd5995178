//! Azure CLI session tests using a stand-in `az` script.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use azcost_azure::{AccessTokenProvider, AzureCliSession, AzureError};
use azcost_cost::{CostError, SessionProvider};
use tempfile::TempDir;

/// Write an executable script that stands in for `az`.
fn fake_az(dir: &TempDir, body: &str) -> PathBuf {
    let script = dir.path().join("az");
    fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}

#[tokio::test]
async fn test_account_show_gives_subscription() {
    let dir = TempDir::new().unwrap();
    let az = fake_az(
        &dir,
        r#"case "$2" in
  show) echo '{"id":"abc","name":"Production","tenantId":"t1"}' ;;
  get-access-token) echo '{"accessToken":"tok-123","subscription":"abc"}' ;;
esac"#,
    );

    let session = AzureCliSession::default().with_program(az.to_string_lossy());

    assert_eq!(session.current_subscription_id().await.unwrap(), "abc");
    assert_eq!(session.access_token().await.unwrap(), "tok-123");
    assert_eq!(session.kind(), "azure-cli");
}

#[tokio::test]
async fn test_subscription_override_is_passed_to_cli() {
    let dir = TempDir::new().unwrap();
    // echo the argument after --subscription back as the account id
    let az = fake_az(
        &dir,
        r#"while [ $# -gt 0 ]; do
  if [ "$1" = "--subscription" ]; then echo "{\"id\":\"$2\"}"; exit 0; fi
  shift
done
echo '{"id":"default"}'"#,
    );

    let session = AzureCliSession::default()
        .with_program(az.to_string_lossy())
        .with_subscription_id("override-sub");

    assert_eq!(session.current_subscription_id().await.unwrap(), "override-sub");
}

#[tokio::test]
async fn test_logged_out_cli_is_not_logged_in() {
    let dir = TempDir::new().unwrap();
    let az = fake_az(&dir, r#"echo "ERROR: Please run 'az login' to setup account." >&2; exit 1"#);

    let session = AzureCliSession::default().with_program(az.to_string_lossy());

    let err = session.access_token().await.unwrap_err();
    assert!(matches!(err, AzureError::NotLoggedIn(ref msg) if msg.contains("az login")));

    let err = session.current_subscription_id().await.unwrap_err();
    assert!(matches!(err, CostError::Session(_)));
}

#[tokio::test]
async fn test_other_cli_failure_is_cli_error() {
    let dir = TempDir::new().unwrap();
    let az = fake_az(&dir, r#"echo "ERROR: subscription not found" >&2; exit 2"#);

    let session = AzureCliSession::default().with_program(az.to_string_lossy());

    let err = session.access_token().await.unwrap_err();
    assert!(matches!(err, AzureError::Cli(ref msg) if msg == "ERROR: subscription not found"));
}
