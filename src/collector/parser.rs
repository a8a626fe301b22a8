//! Interface table parser
//!
//! Line-scans `ip addr show` output with an explicit two-state machine:
//! outside any interface, or inside the most recently opened one. Unknown
//! lines are skipped, so partial or garbled output degrades to a best-effort
//! table instead of an error.

use crate::models::{InterfaceFact, InterfaceStatus};

/// Parse raw `ip addr show` output into interface facts.
///
/// A header line like `1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 ...` opens a
/// new interface; subsequent `inet <addr> ...` lines append addresses to it.
/// Address lines before the first header are dropped.
pub fn parse_interface_table(output: &str) -> Vec<InterfaceFact> {
    let mut interfaces: Vec<InterfaceFact> = Vec::new();

    for line in output.lines() {
        if let Some(fact) = parse_header(line) {
            interfaces.push(fact);
            continue;
        }

        if let Some(current) = interfaces.last_mut() {
            if let Some(address) = parse_inet_address(line) {
                current.addresses.push(address.to_string());
            }
        }
    }

    interfaces
}

/// Parse an interface header: `<index>: <name>: <FLAG,FLAG,...> ...`.
fn parse_header(line: &str) -> Option<InterfaceFact> {
    let line = line.trim();
    let mut parts = line.splitn(3, ':');

    let index = parts.next()?.trim();
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }
    // Virtual links render as `eth0@if24`; the parent name is what matters.
    let name = name.split('@').next().unwrap_or(name);

    let rest = parts.next()?.trim();
    let flags = rest.strip_prefix('<')?.split_once('>')?.0;

    let status = if flags.split(',').any(|f| f.trim() == "UP") {
        InterfaceStatus::Up
    } else {
        InterfaceStatus::Down
    };

    Some(InterfaceFact {
        name: name.to_string(),
        status,
        addresses: Vec::new(),
    })
}

/// Extract the address from an `inet <addr> ...` line, e.g.
/// `inet 1.1.1.1/32 scope host lo`.
fn parse_inet_address(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "inet" {
            return tokens.next();
        }
    }
    None
}
