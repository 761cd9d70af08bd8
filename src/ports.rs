use std::collections::HashSet;
use tracing::warn;

/// Parse port specifiers into a deduplicated list of TCP ports (1..=65535).
///
/// Supported formats per line:
/// - single port number: `1080`
/// - inclusive range: `1080-1085`
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
///
/// A malformed entry (non-numeric, out of range, or inverted range) is
/// skipped with a warning and contributes no ports; it never aborts the run.
pub fn parse_port_specs(s: &str) -> Vec<u16> {
    let mut out: Vec<u16> = Vec::new();
    let mut seen = HashSet::new();

    for raw_line in s.lines() {
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }

        // Range `start-end`
        if let Some((a, b)) = line.split_once('-') {
            let (start, end) = match (parse_port_str(a.trim()), parse_port_str(b.trim())) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    warn!("skipping invalid port range: {line}");
                    continue;
                }
            };
            if start > end {
                warn!("skipping inverted port range: {line}");
                continue;
            }
            for p in start..=end {
                if seen.insert(p) {
                    out.push(p);
                }
            }
            continue;
        }

        // Single number
        match parse_port_str(line) {
            Some(p) => {
                if seen.insert(p) {
                    out.push(p);
                }
            }
            None => warn!("skipping invalid port: {line}"),
        }
    }

    out
}

fn parse_port_str(s: &str) -> Option<u16> {
    match s.parse::<u32>() {
        Ok(v) if (1..=65535).contains(&v) => Some(v as u16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_ports() {
        let input = "80\n22\n   443  \n";
        assert_eq!(parse_port_specs(input), vec![80, 22, 443]);
    }

    #[test]
    fn parse_ranges_and_dedup() {
        let input = "8000-8002\n80\n8001\n";
        assert_eq!(parse_port_specs(input), vec![8000, 8001, 8002, 80]);
    }

    #[test]
    fn parse_with_comments_and_whitespace() {
        let input = r#"
            # proxy ports
            1080  # socks
            3128 # squid
            8080-8082   # alt http

            # blank lines and spaces should be fine
        "#;
        assert_eq!(parse_port_specs(input), vec![1080, 3128, 8080, 8081, 8082]);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        // Out-of-range, non-numeric, and inverted entries contribute nothing.
        let input = "70000\nabc\n0\n90-80\n1080\n";
        assert_eq!(parse_port_specs(input), vec![1080]);
    }
}
