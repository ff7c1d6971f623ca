//! Network and environment probe
//!
//! Runs before anything else so the orchestrator can fail fast with a
//! useful message instead of letting a provider CLI hang on a dead
//! connection.

use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Hosts probed for reachability. Two independent anycast resolvers so a
/// single outage does not produce a false offline verdict.
const PROBE_HOSTS: [&str; 2] = ["1.1.1.1:443", "8.8.8.8:443"];

/// Basic facts about the environment the run starts in.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub online: bool,
    pub platform: &'static str,
    pub ci: bool,
}

/// Check internet reachability and collect environment facts.
pub async fn run() -> ProbeReport {
    let mut online = false;
    for host in PROBE_HOSTS {
        match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(host)).await {
            Ok(Ok(_)) => {
                debug!("reachability probe succeeded via {}", host);
                online = true;
                break;
            }
            Ok(Err(e)) => debug!("probe {} failed: {}", host, e),
            Err(_) => debug!("probe {} timed out", host),
        }
    }

    let report = ProbeReport {
        online,
        platform: std::env::consts::OS,
        ci: std::env::var_os("CI").is_some(),
    };
    info!("environment: platform={} online={} ci={}", report.platform, report.online, report.ci);
    report
}
