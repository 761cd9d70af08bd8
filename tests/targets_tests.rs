use ipnet::Ipv4Net;
use proxy_scan_rs::targets::{expand_cidr, parse_cidrs};
use std::net::{IpAddr, Ipv4Addr};

#[test]
fn expand_includes_network_and_broadcast() {
    let net: Ipv4Net = "10.0.0.0/30".parse().unwrap();
    assert_eq!(
        expand_cidr(net),
        vec![
            Ipv4Addr::new(10, 0, 0, 0),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 0, 0, 3),
        ]
    );
}

#[test]
fn invalid_and_ipv6_entries_contribute_nothing() {
    let lines: Vec<String> = ["garbage", "10.1.2.0/31", "2001:db8::/64", "1.2.3.4"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    // Only the /31 parses as an IPv4 network; a bare IP without a prefix is
    // not a CIDR entry.
    let ips = parse_cidrs(&lines);
    assert_eq!(
        ips,
        vec![
            IpAddr::V4(Ipv4Addr::new(10, 1, 2, 0)),
            IpAddr::V4(Ipv4Addr::new(10, 1, 2, 1)),
        ]
    );
}

#[test]
fn all_invalid_yields_empty_set() {
    let lines = vec!["nope".to_string(), "300.0.0.0/24".to_string()];
    assert!(parse_cidrs(&lines).is_empty());
}
