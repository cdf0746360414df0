//! `ClusterAccess` implementation that shells out to `kubectl`.
//!
//! Every call is one kubectl invocation with JSON output. Port-forwards
//! are long-lived kubectl child processes; the bound local port is read
//! from the first "Forwarding from ..." line kubectl prints.

use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::access::ClusterAccess;
use crate::context::ClusterContext;
use crate::error::{KubeError, KubeResult};
use crate::pod::{Pod, PodRef};

/// How long to wait for kubectl to report a bound forward port.
const FORWARD_READY_TIMEOUT: Duration = Duration::from_secs(10);
/// Probe timeout when checking whether a local port is already bound.
const PORT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Cluster access through the `kubectl` binary.
#[derive(Debug, Clone)]
pub struct KubectlCluster {
    kubectl: String,
}

impl KubectlCluster {
    pub fn new() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
        }
    }

    /// Use a specific kubectl binary instead of the one on PATH.
    pub fn with_binary(kubectl: &str) -> Self {
        Self {
            kubectl: kubectl.to_string(),
        }
    }
}

impl Default for KubectlCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterAccess for KubectlCluster {
    async fn list_pods(
        &self,
        ctx: &ClusterContext,
        namespace: &str,
        selector: &str,
    ) -> KubeResult<Vec<Pod>> {
        let stdout = run_kubectl(
            &self.kubectl,
            &[
                "get",
                "pods",
                "--context",
                &ctx.kube_context,
                "-n",
                namespace,
                "-l",
                selector,
                "-o",
                "json",
            ],
            None,
        )
        .await?;

        let pods = parse_pod_list(&stdout)?;
        debug!(
            cluster = %ctx.cluster,
            namespace,
            selector,
            count = pods.len(),
            "listed pods"
        );
        Ok(pods)
    }

    async fn port_forward(
        &self,
        pod: &PodRef,
        local_port: u16,
        pod_port: u16,
        persistent: bool,
        reuse: bool,
    ) -> KubeResult<u16> {
        if reuse && local_port != 0 && port_open(local_port).await {
            debug!(local_port, %pod, "reusing already-bound local port");
            return Ok(local_port);
        }

        let target = format!("pod/{}", pod.name);
        let ports = format!("{local_port}:{pod_port}");
        let mut child = Command::new(&self.kubectl)
            .args([
                "port-forward",
                "-n",
                &pod.namespace,
                &target,
                &ports,
                "--address",
                "127.0.0.1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(!persistent)
            .spawn()
            .map_err(|source| KubeError::Spawn {
                binary: self.kubectl.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| KubeError::ForwardNotReady {
            pod: pod.to_string(),
        })?;
        let mut lines = BufReader::new(stdout).lines();

        let first_line = tokio::time::timeout(FORWARD_READY_TIMEOUT, lines.next_line())
            .await
            .ok()
            .and_then(Result::ok)
            .flatten();

        let bound = first_line.as_deref().and_then(parse_forward_line);
        let Some(bound) = bound else {
            warn!(%pod, requested = local_port, "kubectl did not report a forward port");
            return Err(KubeError::ForwardNotReady {
                pod: pod.to_string(),
            });
        };

        // Hold the child in a detached task; the forward lives as long
        // as the kubectl process does. Keep draining stdout so kubectl
        // never blocks or dies on a closed pipe.
        tokio::spawn(async move {
            while let Ok(Some(_)) = lines.next_line().await {}
            let _ = child.wait().await;
        });

        debug!(%pod, bound, pod_port, persistent, "port-forward established");
        Ok(bound)
    }
}

/// Run kubectl to completion, feeding optional stdin, returning stdout.
pub(crate) async fn run_kubectl(
    binary: &str,
    args: &[&str],
    stdin: Option<&[u8]>,
) -> KubeResult<Vec<u8>> {
    let mut command = Command::new(binary);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let mut child = command.spawn().map_err(|source| KubeError::Spawn {
        binary: binary.to_string(),
        source,
    })?;

    if let Some(input) = stdin {
        // Take stdin so the pipe closes once written; kubectl reads to EOF.
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input).await.map_err(|source| KubeError::Spawn {
                binary: binary.to_string(),
                source,
            })?;
        }
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| KubeError::Spawn {
            binary: binary.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(KubeError::Kubectl {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

async fn port_open(port: u16) -> bool {
    tokio::time::timeout(
        PORT_PROBE_TIMEOUT,
        TcpStream::connect(("127.0.0.1", port)),
    )
    .await
    .map(|r| r.is_ok())
    .unwrap_or(false)
}

// ── kubectl JSON output ───────────────────────────────────────────

#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<PodItem>,
}

#[derive(Deserialize)]
struct PodItem {
    metadata: PodItemMetadata,
    #[serde(default)]
    status: PodItemStatus,
}

#[derive(Deserialize)]
struct PodItemMetadata {
    name: String,
    #[serde(default)]
    namespace: String,
}

#[derive(Deserialize, Default)]
struct PodItemStatus {
    #[serde(default)]
    phase: String,
}

fn parse_pod_list(stdout: &[u8]) -> KubeResult<Vec<Pod>> {
    let list: PodList = serde_json::from_slice(stdout).map_err(KubeError::Output)?;
    Ok(list
        .items
        .into_iter()
        .map(|item| Pod {
            name: item.metadata.name,
            namespace: item.metadata.namespace,
            phase: item.status.phase,
        })
        .collect())
}

/// Extract the bound local port from kubectl's readiness line, e.g.
/// `Forwarding from 127.0.0.1:55007 -> 50211`.
fn parse_forward_line(line: &str) -> Option<u16> {
    let rest = line.strip_prefix("Forwarding from ")?;
    let address = rest.split(" -> ").next()?;
    address.rsplit(':').next()?.parse().ok()
}
