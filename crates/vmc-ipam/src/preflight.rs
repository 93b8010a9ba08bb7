//! ICMP preflight for candidate VIPs
//!
//! The zone only knows about addresses someone recorded. A ping catches
//! addresses that are live on the wire without a record.

use crate::error::IpamError;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use tokio::process::Command;
use tracing::{debug, info};

/// Result of one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Something answered
    Reply,
    /// Nothing answered before the timeout
    NoReply,
}

/// Checks whether an address answers on the network
#[async_trait]
pub trait AddressProber: Send + Sync {
    /// Probe `ip` once
    async fn probe(&self, ip: Ipv4Addr) -> Result<ProbeOutcome, IpamError>;
}

/// Prober that shells out to `ping`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingProber {
    program: String,
    timeout_secs: u32,
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new("ping", 1)
    }
}

impl PingProber {
    /// Run `program -c 1 -W <timeout_secs> <ip>` per probe
    pub fn new(program: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            program: program.into(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl AddressProber for PingProber {
    async fn probe(&self, ip: Ipv4Addr) -> Result<ProbeOutcome, IpamError> {
        debug!("Pinging {}", ip);
        let output = Command::new(&self.program)
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(self.timeout_secs.to_string())
            .arg(ip.to_string())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| IpamError::Probe(format!("failed to run {}: {}", self.program, e)))?;

        match output.status.code() {
            Some(0) => Ok(ProbeOutcome::Reply),
            Some(1) => Ok(ProbeOutcome::NoReply),
            code => Err(IpamError::Probe(format!(
                "{} {} exited with {}: {}",
                self.program,
                ip,
                code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

/// Fail if any of `addrs` answers a probe
pub async fn ensure_unused<P>(prober: &P, addrs: &[Ipv4Addr]) -> Result<(), IpamError>
where
    P: AddressProber + ?Sized,
{
    for &ip in addrs {
        match prober.probe(ip).await? {
            ProbeOutcome::Reply => return Err(IpamError::AddressInUse(ip)),
            ProbeOutcome::NoReply => info!("{} did not answer, treating it as free", ip),
        }
    }
    Ok(())
}
