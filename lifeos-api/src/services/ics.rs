//! Minimal iCalendar (RFC 5545) reader for importing `VEVENT`s
//!
//! Handles folded lines, `DTSTART`/`DTEND` as UTC (`...Z`), floating or
//! `VALUE=DATE` values, and text escapes. Floating and `TZID` times are read as UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lifeos_common::dates::start_of_day;

const UNTITLED: &str = "(Sans titre)";

/// One event read from the calendar
#[derive(Debug, Clone, PartialEq)]
pub struct IcsEvent {
    pub uid: Option<String>,
    pub summary: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
}

/// Events read, plus the number of `VEVENT` blocks that could not be used
#[derive(Debug, Default)]
pub struct ParsedCalendar {
    pub events: Vec<IcsEvent>,
    pub skipped: usize,
}

/// A content line split into name, parameters and value
#[derive(Debug)]
struct Property<'a> {
    name: String,
    params: Vec<(String, &'a str)>,
    value: &'a str,
}

impl Property<'_> {
    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.trim_matches('"'))
    }
}

#[derive(Debug, Default)]
struct EventBuilder {
    uid: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    start: Option<(DateTime<Utc>, bool)>,
    end: Option<DateTime<Utc>>,
    invalid: bool,
}

impl EventBuilder {
    fn build(self) -> Option<IcsEvent> {
        if self.invalid {
            return None;
        }
        let (start, all_day) = self.start?;
        let end = match self.end {
            Some(end) if end >= start => end,
            Some(_) => return None,
            None if all_day => start + Duration::days(1),
            None => start,
        };
        Some(IcsEvent {
            uid: self.uid.filter(|u| !u.is_empty()),
            summary: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            location: self.location.unwrap_or_default(),
            start,
            end,
            all_day,
        })
    }
}

/// Read every `VEVENT` of `content`
pub fn parse_calendar(content: &str) -> ParsedCalendar {
    let mut parsed = ParsedCalendar::default();
    let mut current: Option<EventBuilder> = None;
    // Nested components (VALARM) inside an event are ignored
    let mut nested_depth = 0usize;

    for line in unfold_lines(content) {
        let Some(prop) = parse_property(&line) else { continue };

        match (prop.name.as_str(), prop.value.trim().to_ascii_uppercase().as_str()) {
            ("BEGIN", "VEVENT") => {
                if current.take().is_some() {
                    parsed.skipped += 1;
                }
                current = Some(EventBuilder::default());
                nested_depth = 0;
                continue;
            }
            ("END", "VEVENT") => {
                if let Some(builder) = current.take() {
                    match builder.build() {
                        Some(event) => parsed.events.push(event),
                        None => parsed.skipped += 1,
                    }
                }
                continue;
            }
            ("BEGIN", _) if current.is_some() => {
                nested_depth += 1;
                continue;
            }
            ("END", _) if current.is_some() => {
                nested_depth = nested_depth.saturating_sub(1);
                continue;
            }
            _ => {}
        }

        let Some(builder) = current.as_mut() else { continue };
        if nested_depth > 0 {
            continue;
        }

        match prop.name.as_str() {
            "UID" => builder.uid = Some(prop.value.trim().to_string()),
            "SUMMARY" => builder.summary = Some(unescape_text(prop.value)),
            "LOCATION" => builder.location = Some(unescape_text(prop.value)),
            "DTSTART" => match parse_ics_datetime(prop.value, prop.param("VALUE")) {
                Some(start) => builder.start = Some(start),
                None => builder.invalid = true,
            },
            "DTEND" => match parse_ics_datetime(prop.value, prop.param("VALUE")) {
                Some((end, _)) => builder.end = Some(end),
                None => builder.invalid = true,
            },
            _ => {}
        }
    }

    if current.is_some() {
        parsed.skipped += 1;
    }
    parsed
}

/// Join folded lines (CRLF or LF followed by a space or tab)
fn unfold_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in content.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        match raw.chars().next() {
            Some(' ') | Some('\t') if !lines.is_empty() => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(&raw[1..]);
                }
            }
            _ if raw.is_empty() => {}
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

fn parse_property(line: &str) -> Option<Property<'_>> {
    // The value starts at the first colon outside a quoted parameter
    let mut in_quotes = false;
    let colon = line.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ':' if !in_quotes => Some(i),
        _ => None,
    })?;

    let (head, value) = (&line[..colon], &line[colon + 1..]);
    let mut segments = head.split(';');
    let name = segments.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    let params = segments
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.trim().to_ascii_uppercase(), v))
        .collect();

    Some(Property { name, params, value })
}

/// Returns the instant and whether it is a whole-day value
fn parse_ics_datetime(value: &str, value_type: Option<&str>) -> Option<(DateTime<Utc>, bool)> {
    let value = value.trim();
    let is_date = value_type.map(|v| v.eq_ignore_ascii_case("DATE")).unwrap_or(false) || value.len() == 8;

    if is_date {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some((start_of_day(date), true));
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    let parsed = NaiveDateTime::parse_from_str(naive, "%Y%m%dT%H%M%S").ok()?;
    Some((Utc.from_utc_datetime(&parsed), false))
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out.trim().to_string()
}
