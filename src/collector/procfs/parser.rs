//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.
//!
//! Every parser tolerates unrelated lines and stops scanning as soon as it has
//! what it needs.

use crate::model::{CpuSample, DiskSample, MemSample, NetSample};
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Parses `/proc/meminfo` content.
///
/// Looks for `MemTotal:` and `MemAvailable:` (values in kB). Scanning stops as
/// soon as both have been seen, whichever comes first in the file.
pub fn parse_meminfo(content: &str) -> Result<MemSample, ParseError> {
    let parse_kb = |line: &str, key: &str| -> Result<u64, ParseError> {
        line.split_whitespace()
            .nth(1)
            .ok_or_else(|| ParseError::new(format!("missing value for {}", key)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid value for {}", key)))
    };

    let mut total = None;
    let mut available = None;

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            total = Some(parse_kb(line, "MemTotal")?);
        } else if line.starts_with("MemAvailable:") {
            available = Some(parse_kb(line, "MemAvailable")?);
        }

        if total.is_some() && available.is_some() {
            break;
        }
    }

    match (total, available) {
        (Some(total_kb), Some(available_kb)) => Ok(MemSample {
            total_kb,
            available_kb,
        }),
        (None, _) => Err(ParseError::new("MemTotal not found in meminfo")),
        (_, None) => Err(ParseError::new("MemAvailable not found in meminfo")),
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Per-core lines (`cpu0`, `cpu1`, ...) are skipped. The aggregate line must
/// carry at least eight numeric counters; `guest` and `guest_nice` are ignored.
pub fn parse_cpu_total(content: &str) -> Result<CpuSample, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("aggregate cpu line not found in stat"))?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|s| s.parse())
        .collect::<Result<_, _>>()
        .map_err(|_| ParseError::new("invalid counter in cpu line"))?;

    if values.len() < 8 {
        return Err(ParseError::new(format!(
            "not enough fields in cpu line: expected 8, got {}",
            values.len()
        )));
    }

    Ok(CpuSample {
        user: values[0],
        nice: values[1],
        system: values[2],
        idle: values[3],
        iowait: values[4],
        irq: values[5],
        softirq: values[6],
        steal: values[7],
    })
}

/// Parses `/proc/diskstats` content and returns the counters of `device`.
///
/// Token layout read by the sampler (0-based):
/// `major minor name _ _ read_sectors read_ms _ _ _ write_sectors write_ms ...`
///
/// A line must carry all twelve positions with numeric counters; anything
/// shorter or malformed is skipped. Returns `None` when no line names the
/// device.
pub fn parse_diskstats(content: &str, device: &str) -> Option<DiskSample> {
    content.lines().find_map(|line| {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 12 || parts[2] != device {
            return None;
        }

        parts[0].parse::<u32>().ok()?;
        parts[1].parse::<u32>().ok()?;

        let mut counters = [0u64; 9];
        for (slot, raw) in counters.iter_mut().zip(&parts[3..12]) {
            *slot = raw.parse().ok()?;
        }

        Some(DiskSample {
            reads: counters[2],
            read_time: counters[3],
            writes: counters[7],
            write_time: counters[8],
        })
    })
}

/// Parses `/proc/net/dev` content and returns the counters of `interface`.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
///
/// The first two lines are headers. Large counters can be glued to the colon
/// (`eth0:123456`), so the name is everything before the first `:`.
pub fn parse_net_dev(content: &str, interface: &str) -> Option<NetSample> {
    content.lines().skip(2).find_map(|line| {
        let (name, rest) = match line.split_once(':') {
            Some((name, rest)) => (name.trim(), rest),
            None => {
                let trimmed = line.trim_start();
                let end = trimmed.find(char::is_whitespace)?;
                (&trimmed[..end], &trimmed[end..])
            }
        };
        if name != interface {
            return None;
        }

        let values: Vec<u64> = rest
            .split_whitespace()
            .take(10)
            .map(|s| s.parse().ok())
            .collect::<Option<_>>()?;
        if values.len() < 10 {
            return None;
        }

        Some(NetSample {
            rx_bytes: values[0],
            rx_packets: values[1],
            tx_bytes: values[8],
            tx_packets: values[9],
        })
    })
}

/// Finds the first `<key> <value>` line of `/proc/stat` and parses its value.
fn parse_stat_field<T: std::str::FromStr>(content: &str, key: &str) -> Option<T> {
    content.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        if parts.next() != Some(key) {
            return None;
        }
        parts.next()?.parse().ok()
    })
}

/// Extracts `procs_running` from `/proc/stat`.
pub fn parse_procs_running(content: &str) -> Option<i32> {
    parse_stat_field(content, "procs_running")
}

/// Extracts the cumulative context switch counter (`ctxt`) from `/proc/stat`.
pub fn parse_context_switches(content: &str) -> Option<u64> {
    parse_stat_field(content, "ctxt")
}
