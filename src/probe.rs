use crate::config::ScanConfig;
use crate::types::Protocol;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

/// Destination the probes ask the candidate proxy to relay to. Both SOCKS
/// probes request a CONNECT to port 80; SOCKS4 has to carry a literal IPv4
/// address, SOCKS5 sends the domain name.
const DEST_DOMAIN: &str = "www.google.com";
const DEST_IPV4: Ipv4Addr = Ipv4Addr::new(142, 250, 74, 68);
const DEST_PORT: u16 = 80;

const HTTP_REQUEST: &[u8] =
    b"GET http://www.google.com/ HTTP/1.1\r\nHost: www.google.com\r\nConnection: close\r\n\r\n";

/// Run the probes in fixed priority order (HTTP, then SOCKS4, then SOCKS5)
/// and return the first matching protocol. A match short-circuits the
/// remaining probes, so one target yields at most one result.
pub async fn detect(addr: SocketAddr, cfg: &ScanConfig) -> Option<Protocol> {
    if check_http(addr, cfg).await {
        return Some(Protocol::Http);
    }
    if check_socks4(addr, cfg).await {
        return Some(Protocol::Socks4);
    }
    if check_socks5(addr, cfg).await {
        return Some(Protocol::Socks5);
    }
    None
}

/// Open a connection bounded by the connect timeout. Refusal and timeout both
/// yield `None`: absence of a proxy is an expected outcome, not an error.
async fn connect(addr: SocketAddr, cfg: &ScanConfig) -> Option<TcpStream> {
    match time::timeout(cfg.connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Some(stream),
        _ => None,
    }
}

/// HTTP proxy probe: issue an absolute-URI GET through the candidate and
/// accept any response that looks like an HTTP status line.
pub async fn check_http(addr: SocketAddr, cfg: &ScanConfig) -> bool {
    let Some(mut stream) = connect(addr, cfg).await else {
        return false;
    };
    if stream.write_all(HTTP_REQUEST).await.is_err() {
        return false;
    }
    let mut buf = vec![0u8; 4096];
    let n = match time::timeout(cfg.read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => n,
        _ => return false,
    };
    let resp = String::from_utf8_lossy(&buf[..n]);
    resp.contains("HTTP/1.1") || resp.contains("HTTP/1.0")
}

/// SOCKS4 probe: 9-byte CONNECT request (version 4, command 1, dest port 80,
/// literal dest IPv4, empty user-id). Granted iff the second reply byte is
/// 0x5A.
pub async fn check_socks4(addr: SocketAddr, cfg: &ScanConfig) -> bool {
    let Some(mut stream) = connect(addr, cfg).await else {
        return false;
    };
    let mut req = Vec::with_capacity(9);
    req.extend_from_slice(&[0x04, 0x01]);
    req.extend_from_slice(&DEST_PORT.to_be_bytes());
    req.extend_from_slice(&DEST_IPV4.octets());
    req.push(0x00); // null-terminated empty user-id
    if stream.write_all(&req).await.is_err() {
        return false;
    }
    let mut reply = [0u8; 8];
    match time::timeout(cfg.read_timeout, stream.read(&mut reply)).await {
        Ok(Ok(n)) if n >= 2 => reply[1] == 0x5A,
        _ => false,
    }
}

/// SOCKS5 probe: no-auth greeting, then a domain-based CONNECT. Matches iff
/// the server selects no-auth (method 0x00) and the CONNECT reply code is
/// 0x00.
pub async fn check_socks5(addr: SocketAddr, cfg: &ScanConfig) -> bool {
    let Some(mut stream) = connect(addr, cfg).await else {
        return false;
    };
    // Greeting: version 5, one method, method 0x00 (no auth).
    if stream.write_all(&[0x05, 0x01, 0x00]).await.is_err() {
        return false;
    }
    let mut choice = [0u8; 2];
    match time::timeout(cfg.read_timeout, stream.read(&mut choice)).await {
        Ok(Ok(n)) if n >= 2 && choice[1] == 0x00 => {}
        _ => return false,
    }
    // CONNECT: version 5, command 1, reserved, address-type 3 (domain).
    let mut req = vec![0x05, 0x01, 0x00, 0x03, DEST_DOMAIN.len() as u8];
    req.extend_from_slice(DEST_DOMAIN.as_bytes());
    req.extend_from_slice(&DEST_PORT.to_be_bytes());
    if stream.write_all(&req).await.is_err() {
        return false;
    }
    let mut reply = [0u8; 10];
    match time::timeout(cfg.read_timeout, stream.read(&mut reply)).await {
        Ok(Ok(n)) if n >= 2 => reply[1] == 0x00,
        _ => false,
    }
}
