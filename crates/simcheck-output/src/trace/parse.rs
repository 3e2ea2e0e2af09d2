use std::sync::OnceLock;

use regex::Regex;

use super::{SourceLocation, TraceEntry};

impl TraceEntry {
    /// Parse one trace line.
    ///
    /// Accepts `<Stage>: <instruction>` with an optional ` [<file>:<line>]`
    /// suffix. Returns `None` for lines that are not trace lines at all. A
    /// suffix that looks like a location but does not parse (bad line
    /// number, missing colon) leaves the entry without debug info and the
    /// bracket text in the instruction.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let pattern = TRACE_PATTERN.get_or_init(|| {
            Regex::new(
                r"^(Fetch|Decode|Execute|Memory|Writeback):\s+(.+?)(?:\s+\[([^:\[\]]+):(-?\d+)\])?\s*$",
            )
            .unwrap()
        });
        let caps = pattern.captures(line)?;

        let stage = caps.get(1)?.as_str().parse().ok()?;
        let location = match (caps.get(3), caps.get(4)) {
            (Some(file), Some(num)) => num.as_str().parse::<i64>().ok().map(|line| SourceLocation {
                file: file.as_str().to_string(),
                line,
            }),
            _ => None,
        };

        let instruction = if location.is_some() {
            caps.get(2)?.as_str().trim().to_string()
        } else {
            // Keep everything after the stage, including an unparseable
            // bracket, so nothing is silently lost.
            let colon = caps.get(1)?.end();
            line[colon + 1..].trim().to_string()
        };

        Some(Self {
            stage,
            instruction,
            location,
        })
    }
}

/// Extract trace entries from simulator output, in emission order.
///
/// Lines that are not trace lines (banners, register dumps, warnings) are
/// dropped.
pub fn parse_trace(text: &str) -> Vec<TraceEntry> {
    text.lines().filter_map(TraceEntry::parse).collect()
}

static TRACE_PATTERN: OnceLock<Regex> = OnceLock::new();
