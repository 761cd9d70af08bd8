use ipnet::Ipv4Net;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use tracing::warn;

/// Parse a list of CIDR lines into the ordered set of target addresses.
///
/// Each line holds one IPv4 CIDR block (e.g. `10.0.0.0/24`). Comments after
/// `#`, blank lines, and surrounding whitespace are ignored. A malformed
/// entry (or an IPv6 one) is skipped with a warning and never aborts the
/// expansion. Duplicate addresses across overlapping blocks are removed,
/// keeping the first appearance.
pub fn parse_cidrs(lines: &[String]) -> Vec<IpAddr> {
    let mut out: Vec<IpAddr> = Vec::new();
    let mut seen = HashSet::new();

    for raw_line in lines {
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }
        match line.parse::<Ipv4Net>() {
            Ok(net) => {
                for ip in expand_cidr(net) {
                    if seen.insert(ip) {
                        out.push(IpAddr::V4(ip));
                    }
                }
            }
            Err(e) => warn!("skipping invalid CIDR {line}: {e}"),
        }
    }

    out
}

/// Expand an IPv4 network into every address it covers, from the network
/// address through the broadcast address inclusive. `10.0.0.0/30` yields
/// `.0`, `.1`, `.2`, `.3`.
pub fn expand_cidr(net: Ipv4Net) -> Vec<Ipv4Addr> {
    let start = u32::from(net.network());
    let end = u32::from(net.broadcast());
    (start..=end).map(Ipv4Addr::from).collect()
}
