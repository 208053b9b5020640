//! Transient `zanod` run used while provisioning the wallet
//!
//! The daemon is started in the background, polled over JSON-RPC until it
//! answers, and terminated once the wallet sessions are done.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use log::{info, warn};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use serde::Deserialize;
use serde_json::json;

use crate::config::SetupConfig;
use crate::install::error::SetupError;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const DAEMON_NAME: &str = "zanod";

/// Subset of the `getinfo` result we report
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonInfo {
    pub height: u64,
    #[serde(default)]
    pub daemon_network_state: Option<u32>,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<DaemonInfo>,
}

/// How a stop request reached the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// SIGTERM sent to the tracked pid
    Signalled,
    /// Tracked pid was gone; SIGTERM broadcast to processes by name
    Broadcast,
}

/// Background process we spawned and must stop again
pub struct DaemonHandle {
    child: tokio::process::Child,
    pid: u32,
    name: String,
}

impl DaemonHandle {
    /// Spawn `program` detached from our stdio, output going to its own log.
    pub fn spawn(program: &Path, args: &[String]) -> Result<Self, SetupError> {
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SetupError::Command {
                program: name.clone(),
                detail: e.to_string(),
            })?;

        let pid = child
            .id()
            .ok_or_else(|| SetupError::DaemonExited(format!("{name} exited immediately")))?;

        info!("Started {} in background (pid {})", name, pid);
        Ok(Self { child, pid, name })
    }

    /// Poll `rpc_url` until the daemon answers `getinfo`, it exits, or `limit` elapses.
    pub async fn wait_until_ready(
        &mut self,
        rpc_url: &str,
        limit: Duration,
    ) -> Result<DaemonInfo, SetupError> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| SetupError::System(format!("Failed to create HTTP client: {e}")))?;

        info!("Waiting for {} RPC at {} (timeout: {:?})", self.name, rpc_url, limit);
        let start = Instant::now();

        loop {
            if let Some(status) = self.child.try_wait()? {
                return Err(SetupError::DaemonExited(format!("{} {}", self.name, status)));
            }

            if let Some(daemon_info) = probe(&client, rpc_url).await {
                info!(
                    "{} is ready at height {} (took {:?})",
                    self.name,
                    daemon_info.height,
                    start.elapsed()
                );
                return Ok(daemon_info);
            }

            if start.elapsed() >= limit {
                return Err(SetupError::DaemonTimeout(limit));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Terminate the daemon and wait (bounded) for it to exit.
    pub async fn stop(mut self, limit: Duration) -> Result<StopOutcome, SetupError> {
        // Reap first: an exited child would otherwise still answer kill(pid, 0).
        let outcome = if self.child.try_wait()?.is_some() {
            warn!(
                "{} (pid {}) already exited, stopping any other {} processes by name",
                self.name, self.pid, self.name
            );
            broadcast_term(&self.name);
            StopOutcome::Broadcast
        } else {
            stop_process(self.pid, &self.name)
        };

        if outcome == StopOutcome::Signalled {
            match tokio::time::timeout(limit, self.child.wait()).await {
                Ok(status) => info!("{} stopped ({})", self.name, status?),
                Err(_) => {
                    warn!("{} ignored SIGTERM for {:?}, killing", self.name, limit);
                    self.child.kill().await?;
                }
            }
        }

        Ok(outcome)
    }
}

/// Start `zanod` for the wallet sessions and wait until its RPC answers.
pub async fn start_transient(cfg: &SetupConfig) -> Result<DaemonHandle, SetupError> {
    let args = vec![
        format!("--rpc-bind-port={}", cfg.daemon_rpc_port),
        format!("--log-file={}", cfg.work_dir.join("zanod-setup.log").display()),
        "--no-console".to_string(),
    ];

    let running = running_pids(DAEMON_NAME);
    if !running.is_empty() {
        warn!(
            "{} is already running (pid {:?}), likely zanod.service from an earlier install; \
             it may hold the RPC port and will be stopped if the setup daemon exits early",
            DAEMON_NAME, running
        );
    }

    let mut handle = DaemonHandle::spawn(&cfg.zanod_path(), &args)?;
    if let Err(e) = handle
        .wait_until_ready(&cfg.daemon_rpc_url(), cfg.daemon_ready_timeout())
        .await
    {
        // Never leave the daemon behind when provisioning cannot continue.
        let _ = handle.stop(cfg.daemon_stop_timeout()).await;
        return Err(e);
    }
    Ok(handle)
}

/// One `getinfo` round trip; `None` while the daemon is not answering yet.
pub async fn probe(client: &reqwest::Client, rpc_url: &str) -> Option<DaemonInfo> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": "getinfo",
        "params": {}
    });

    let response = client.post(rpc_url).json(&request).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.json::<RpcResponse>().await.ok()?.result
}

/// SIGTERM `pid` if it is still in the process table, otherwise broadcast
/// SIGTERM to every process called `name`.
pub fn stop_process(pid: u32, name: &str) -> StopOutcome {
    let target = Pid::from_raw(pid as i32);

    if kill(target, None).is_ok() && kill(target, Signal::SIGTERM).is_ok() {
        info!("Sent SIGTERM to {} (pid {})", name, pid);
        return StopOutcome::Signalled;
    }

    warn!("pid {} is gone, stopping {} by name", pid, name);
    broadcast_term(name);
    StopOutcome::Broadcast
}

/// Pids of processes named exactly `name`; empty when none or `pgrep` fails.
pub fn running_pids(name: &str) -> Vec<u32> {
    match std::process::Command::new("pgrep").args(["-x", name]).output() {
        Ok(output) => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect(),
        Err(e) => {
            warn!("Failed to run pgrep: {}", e);
            Vec::new()
        }
    }
}

fn broadcast_term(name: &str) {
    match std::process::Command::new("pkill")
        .args(["-TERM", "-x", name])
        .output()
    {
        // pkill exits 1 when nothing matched
        Ok(output) if output.status.code() == Some(1) => {
            info!("No running {} processes", name)
        }
        Ok(output) if !output.status.success() => warn!(
            "pkill {} failed: {}",
            name,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Ok(_) => info!("Sent SIGTERM to all {} processes", name),
        Err(e) => warn!("Failed to run pkill: {}", e),
    }
}
