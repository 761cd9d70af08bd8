use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// One (address, port) pair awaiting probing. Created by the task generator,
/// consumed exactly once by exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Task {
    pub ip: IpAddr,
    pub port: u16,
}

/// Proxy protocol a probe can confirm, in detection priority order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Protocol {
    Http,
    Socks4,
    Socks5,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Protocol::Http => "HTTP",
            Protocol::Socks4 => "SOCKS4",
            Protocol::Socks5 => "SOCKS5",
        };
        f.write_str(label)
    }
}

/// One confirmed open proxy. Formats as the output line `<ip>:<port> - <PROTOCOL>`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProxyHit {
    pub ip: IpAddr,
    pub port: u16,
    pub protocol: Protocol,
}

impl fmt::Display for ProxyHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} - {}", self.ip, self.port, self.protocol)
    }
}

/// Aggregate counters for a completed scan.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
pub struct ScanSummary {
    pub scanned: u64,
    pub hits: u64,
}
