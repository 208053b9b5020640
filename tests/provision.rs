//! Wallet provisioning against stand-in `zanod` / `simplewallet` executables
//! and an in-process JSON-RPC responder.

use std::collections::VecDeque;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use zano_setup::config::SetupConfig;
use zano_setup::install::SetupError;
use zano_setup::install::linux::build_units;
use zano_setup::install::wallet::parse::{SEED_CONFIRMATION, is_valid_address};
use zano_setup::install::wallet::{self, Prompter};

const ADDRESS: &str = "ZxMASi45ub7Qe4ZE36UT5G6cU4ud8Fhhe4deS4F3cw9KTAb8dLcukC7edhDQ7cn5d4gEYkbUrMWeWQLGsCmrG6dLaYyNoVKf5";
const SEED: &str = "lion vanish crumble hollow sister orbit fancy dwell rocket mellow bitter clutch weird season lawn crane hazard trophy noble pistol quote gallop velvet anchor ribbon tunnel";

struct Answers(VecDeque<String>);

impl Answers {
    fn new(answers: &[&str]) -> Self {
        Self(answers.iter().map(|a| a.to_string()).collect())
    }
}

impl Prompter for Answers {
    fn text(&mut self, _message: &str) -> Result<String, SetupError> {
        self.0.pop_front().ok_or(SetupError::Cancelled)
    }

    fn secret(&mut self, message: &str) -> Result<String, SetupError> {
        self.text(message)
    }
}

fn write_executable(path: &Path, script: &str) {
    fs::write(path, script).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// `zanod` that just stays alive until terminated
fn fake_zanod(work_dir: &Path) {
    write_executable(&work_dir.join("zanod"), "#!/bin/sh\nexec sleep 60\n");
}

/// `simplewallet` that stores the password as the wallet file and checks it on open
fn fake_simplewallet(work_dir: &Path) {
    let script = format!(
        r#"#!/bin/sh
ADDR={ADDRESS}
case "$1" in
  --generate-new-wallet=*)
    f="${{1#--generate-new-wallet=}}"
    read p1; read p2
    [ "$p1" = "$p2" ] || {{ echo "Error: passwords do not match"; exit 1; }}
    printf '%s' "$p1" > "$f"
    echo "Generated new wallet: $ADDR"
    ;;
  --wallet-file=*)
    f="${{1#--wallet-file=}}"
    read p
    [ "$p" = "$(cat "$f")" ] || {{ echo "Error: wrong password"; exit 1; }}
    echo "Opened wallet: $ADDR"
    if read cmd && [ "$cmd" = show_seed ]; then
      read p; read s1; read s2
      echo "{SEED_CONFIRMATION}"
      echo "{SEED} [secured seed]"
    fi
    ;;
esac
"#
    );
    write_executable(&work_dir.join("simplewallet"), &script);
}

/// Answers every connection with a `getinfo` result; returns the bound port.
async fn spawn_rpc_responder() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = r#"{"id":0,"jsonrpc":"2.0","result":{"height":1000,"daemon_network_state":2}}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    port
}

async fn test_config(work_dir: &Path) -> SetupConfig {
    SetupConfig {
        work_dir: work_dir.to_path_buf(),
        daemon_rpc_port: spawn_rpc_responder().await,
        daemon_ready_timeout_secs: 10,
        daemon_stop_timeout_secs: 5,
        ..SetupConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn generated_passwords_produce_complete_wallet() {
    let dir = tempfile::tempdir().unwrap();
    fake_zanod(dir.path());
    fake_simplewallet(dir.path());
    let cfg = test_config(dir.path()).await;

    let mut answers = Answers::new(&["savings", "n", "n"]);
    let request = wallet::collect_request(&mut answers, &cfg.work_dir).unwrap();
    assert_eq!(request.password.len(), 16);
    assert_eq!(request.seed_password.len(), 16);

    let record = wallet::provision(&cfg, request).await.unwrap();

    assert!(record.file.exists());
    assert!(is_valid_address(&record.address));
    assert_eq!(record.address, ADDRESS);
    assert_eq!(record.seed_phrase, SEED);

    let details = fs::read_to_string(dir.path().join("savings-details.txt")).unwrap();
    let lines: Vec<&str> = details.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().all(|l| l.split_once(": ").is_some_and(|(_, v)| !v.is_empty())));

    let mode = fs::metadata(dir.path().join("savings-details.txt"))
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(mode, 0o600);
}

#[tokio::test(flavor = "multi_thread")]
async fn units_reference_provisioned_wallet() {
    let dir = tempfile::tempdir().unwrap();
    fake_zanod(dir.path());
    fake_simplewallet(dir.path());
    let cfg = test_config(dir.path()).await;

    let mut answers = Answers::new(&["staker", "y", "abc123", "abc124", "abc123", "abc123", "n"]);
    let request = wallet::collect_request(&mut answers, &cfg.work_dir).unwrap();
    assert_eq!(request.password, "abc123");

    let record = wallet::provision(&cfg, request).await.unwrap();
    let units = build_units(&cfg, "staker", &record, None);
    let staking = units[2].render();

    assert!(staking.contains(&format!("--wallet-file={}", record.file.display())));
    assert!(staking.contains("--password=abc123"));
    assert!(!staking.contains("--pos-mining-reward-address"));
    assert!(units[0].render().contains(&format!("--stratum-miner-address={ADDRESS}")));
}

/// Config whose RPC port has no listener
fn unreachable_daemon_config(work_dir: &Path) -> SetupConfig {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    SetupConfig {
        work_dir: work_dir.to_path_buf(),
        daemon_rpc_port: port,
        daemon_ready_timeout_secs: 1,
        daemon_stop_timeout_secs: 5,
        ..SetupConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unresponsive_daemon_fails_instead_of_guessing() {
    let dir = tempfile::tempdir().unwrap();
    fake_zanod(dir.path());
    fake_simplewallet(dir.path());
    let cfg = unreachable_daemon_config(dir.path());

    let mut answers = Answers::new(&["late", "n", "n"]);
    let request = wallet::collect_request(&mut answers, &cfg.work_dir).unwrap();
    let err = wallet::provision(&cfg, request).await.unwrap_err();

    assert!(matches!(err, SetupError::DaemonTimeout(_)));
    assert!(!dir.path().join("late.wallet").exists());
    assert!(!dir.path().join("late-details.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn confirmed_overwrite_replaces_wallet_and_details() {
    let dir = tempfile::tempdir().unwrap();
    fake_zanod(dir.path());
    fake_simplewallet(dir.path());
    let cfg = test_config(dir.path()).await;

    let wallet_file = dir.path().join("savings.wallet");
    let details_file = dir.path().join("savings-details.txt");
    fs::write(&wallet_file, "previous").unwrap();
    fs::write(&details_file, "Wallet Name: savings\n").unwrap();

    let mut answers = Answers::new(&["savings", "y", "y", "abc123", "abc123", "n"]);
    let request = wallet::collect_request(&mut answers, &cfg.work_dir).unwrap();
    let record = wallet::provision(&cfg, request).await.unwrap();

    // The stand-in wallet stores its password as the file content.
    assert_eq!(fs::read_to_string(&record.file).unwrap(), "abc123");
    let details = fs::read_to_string(&details_file).unwrap();
    assert_eq!(details.lines().count(), 6);
    assert!(details.contains(&format!("Wallet Address: {ADDRESS}")));
    assert!(details.contains("Wallet Password: abc123"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_daemon_start_keeps_previous_wallet() {
    let dir = tempfile::tempdir().unwrap();
    fake_zanod(dir.path());
    fake_simplewallet(dir.path());
    let cfg = unreachable_daemon_config(dir.path());

    let wallet_file = dir.path().join("old.wallet");
    fs::write(&wallet_file, "previous").unwrap();

    let mut answers = Answers::new(&["old", "y", "n", "n"]);
    let request = wallet::collect_request(&mut answers, &cfg.work_dir).unwrap();
    let err = wallet::provision(&cfg, request).await.unwrap_err();

    assert!(matches!(err, SetupError::DaemonTimeout(_)));
    assert_eq!(fs::read_to_string(&wallet_file).unwrap(), "previous");
    assert!(!dir.path().join("old-details.txt").exists());
}
