use std::process::Stdio;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::types::ProbeResult;

/// Extra time allowed for process start and teardown on top of the ping timeout
const SPAWN_GRACE: Duration = Duration::from_secs(1);

static PING_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=([\d.]+)\s*ms").expect("ping time pattern is valid"));

/// Type of reachability check to perform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    #[default]
    Ping,
    Tcp,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeKind::Ping => write!(f, "ping"),
            ProbeKind::Tcp => write!(f, "tcp"),
        }
    }
}

/// A single reachability check against one host
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Check `host` once. Never fails: anything that goes wrong is a down result.
    async fn probe(&self, host: &str) -> ProbeResult;
}

#[async_trait::async_trait]
impl<P: Prober + ?Sized> Prober for Box<P> {
    async fn probe(&self, host: &str) -> ProbeResult {
        (**self).probe(host).await
    }
}

/// Build the prober selected by configuration
pub fn from_kind(kind: ProbeKind, timeout_secs: u64, tcp_port: u16) -> Box<dyn Prober> {
    match kind {
        ProbeKind::Ping => Box::new(PingProber::new(timeout_secs)),
        ProbeKind::Tcp => Box::new(TcpProber::new(timeout_secs, tcp_port)),
    }
}

/// Interpret the text and exit status of one `ping` run.
///
/// A parsed round-trip time wins even over a failing exit status. A clean
/// exit without a time is reachable with no latency; anything else is down.
pub fn interpret_ping_output(output: &str, success: bool) -> ProbeResult {
    if let Some(ms) = PING_TIME
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return ProbeResult::up(ms);
    }
    if success { ProbeResult::up_without_latency() } else { ProbeResult::down() }
}

/// Probe by running the system `ping` for a single packet
pub struct PingProber {
    program: String,
    timeout_secs: u64,
}

impl PingProber {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_program("ping", timeout_secs)
    }

    /// Use a different executable with ping-compatible arguments
    pub fn with_program(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self { program: program.into(), timeout_secs }
    }

    fn command(&self, host: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg("1")
            .arg("-W")
            .arg(self.timeout_secs.to_string())
            // The host is never parsed as an option
            .arg("--")
            .arg(host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl Prober for PingProber {
    async fn probe(&self, host: &str) -> ProbeResult {
        if host.is_empty() {
            return ProbeResult::down();
        }

        let child = match self.command(host).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(%host, program = %self.program, "Failed to start reachability check: {}", e);
                return ProbeResult::down();
            }
        };

        let limit = Duration::from_secs(self.timeout_secs) + SPAWN_GRACE;
        // Dropping the future on timeout kills the child
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(%host, "Reachability check failed: {}", e);
                return ProbeResult::down();
            }
            Err(_) => {
                warn!(%host, limit_ms = limit.as_millis() as u64, "Reachability check timed out");
                return ProbeResult::down();
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let result = interpret_ping_output(&text, output.status.success());
        debug!(%host, code = ?output.status.code(), ?result, "Ping finished");
        result
    }
}

/// Probe by opening a TCP connection to a fixed port
pub struct TcpProber {
    timeout_duration: Duration,
    port: u16,
}

impl TcpProber {
    pub fn new(timeout_secs: u64, port: u16) -> Self {
        Self { timeout_duration: Duration::from_secs(timeout_secs), port }
    }
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str) -> ProbeResult {
        if host.is_empty() {
            return ProbeResult::down();
        }

        let start = Instant::now();
        let connect = TcpStream::connect((host, self.port));

        match timeout(self.timeout_duration, connect).await {
            Ok(Ok(_)) => ProbeResult::up(start.elapsed().as_secs_f64() * 1000.0),
            Ok(Err(e)) => {
                debug!(%host, port = self.port, "TCP connection failed: {}", e);
                ProbeResult::down()
            }
            Err(_) => {
                debug!(%host, port = self.port, "TCP connection timeout");
                ProbeResult::down()
            }
        }
    }
}
