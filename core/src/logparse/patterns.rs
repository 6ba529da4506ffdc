//! Line classifiers for field-system control logs.
//!
//! Every event line starts with a fixed-width `YYYY.DDD.HH:MM:SS.ff`
//! timestamp; the rest of the line is the payload. Lines that do not match
//! the timestamp pattern carry no event semantics at all.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::prelude::Wrap;

const TIME_FORMAT: &str = "%Y.%j.%H:%M:%S%.f";

/// A classified control-log event.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// Start of a new scan window.
    ScanBoundary {
        name: String,
        session: String,
        station: String,
    },
    /// Source declaration; marks the start of slewing.
    Source { name: String, wrap: Wrap },
    /// Slew complete, in any of its textual synonyms.
    SourceAcquired,
    Preob,
    Postob,
    /// Radar-masking marker.
    Radar,
    /// Halts parsing of the remainder of the file.
    ScheduleEnd,
    /// On-sky position sample in degrees.
    Position { az: f64, el: f64 },
    /// Tracking error sample.
    PointingError { az: f64, el: f64 },
}

struct Patterns {
    timestamp: Regex,
    scan: Regex,
    source: Regex,
    acquired: Regex,
    preob: Regex,
    postob: Regex,
    radar: Regex,
    end: Regex,
    position: Regex,
    error: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        timestamp: Regex::new(
            r"^(?P<time>\d{4}\.\d{3}\.\d{2}:\d{2}:\d{2}\.\d{2,6})(?P<data>.*)$",
        )
        .unwrap(),
        scan: Regex::new(r"^:scan_name=(?P<name>[^,]+),(?P<session>[^,]+),(?P<station>\w{2}),\d*,\d*")
            .unwrap(),
        source: Regex::new(r"^:source=(?P<name>[^,]+),(?:[^,]*,){3}(?P<wrap>neutral|cw|ccw)")
            .unwrap(),
        acquired: Regex::new(
            r"^(?:flagr/antenna,acquired|#trakl#Source acquired|#trakl# Source acquired|#start#Source reached)",
        )
        .unwrap(),
        preob: Regex::new(r"^:preob").unwrap(),
        postob: Regex::new(r"^:postob").unwrap(),
        radar: Regex::new(r"^#trakl# Masking Radar").unwrap(),
        end: Regex::new(r"^:sched_end").unwrap(),
        position: Regex::new(r"^#trakl#\[az\s*(?P<az>\S+) el\s*(?P<el>\S+) azv.*\]").unwrap(),
        error: Regex::new(r"^#trakl#\{AzErr (?P<az>\S+) ElErr (?P<el>\S+)\}").unwrap(),
    })
}

/// Classifies one raw log line.
///
/// Returns the line's timestamp and event, or `None` when the line is not
/// an event: no timestamp, an unknown payload, or numeric fields that fail
/// to parse.
pub fn classify(line: &str) -> Option<(NaiveDateTime, LogEvent)> {
    let p = patterns();
    let caps = p.timestamp.captures(line)?;
    let stamp = NaiveDateTime::parse_from_str(&caps["time"], TIME_FORMAT).ok()?;
    let payload = caps.name("data").map(|m| m.as_str()).unwrap_or("");

    let event = classify_payload(p, payload)?;
    Some((stamp, event))
}

fn classify_payload(p: &Patterns, payload: &str) -> Option<LogEvent> {
    if p.end.is_match(payload) {
        return Some(LogEvent::ScheduleEnd);
    }
    if p.postob.is_match(payload) {
        return Some(LogEvent::Postob);
    }
    if let Some(caps) = p.scan.captures(payload) {
        return Some(LogEvent::ScanBoundary {
            name: caps["name"].to_string(),
            session: caps["session"].to_string(),
            station: caps["station"].to_string(),
        });
    }
    if let Some(caps) = p.source.captures(payload) {
        return Some(LogEvent::Source {
            name: caps["name"].to_string(),
            wrap: Wrap::from_token(&caps["wrap"])?,
        });
    }
    if p.acquired.is_match(payload) {
        return Some(LogEvent::SourceAcquired);
    }
    if p.preob.is_match(payload) {
        return Some(LogEvent::Preob);
    }
    if p.radar.is_match(payload) {
        return Some(LogEvent::Radar);
    }
    if let Some(caps) = p.position.captures(payload) {
        let az = caps["az"].parse().ok()?;
        let el = caps["el"].parse().ok()?;
        return Some(LogEvent::Position { az, el });
    }
    if let Some(caps) = p.error.captures(payload) {
        let az = caps["az"].parse().ok()?;
        let el = caps["el"].parse().ok()?;
        return Some(LogEvent::PointingError { az, el });
    }
    None
}
