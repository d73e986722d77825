// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Temporal adapters.
//!
//! Every temporal kind has exactly one canonical text form. Decoding is
//! strict: the input must parse *and* equal the canonical rendering of the
//! parsed value, so `2024-1-5` or `2024-05-01T10:00:00+02:00` are rejected.
//!
//! | Kind | Canonical form |
//! |------|----------------|
//! | Instant | `2024-05-01T10:15:30.250Z` (UTC, 0/3/6/9 fraction digits) |
//! | Date | `2024-05-01` |
//! | DateTime | `2024-05-01T10:15:30` / `2024-05-01T10:15:30.250` |
//! | Time | `10:15:30` / `10:15:30.250` |
//! | Duration | `PT1H30M`, `PT0.500S`, `-PT2M`, zero is `PT0S` |
//!
//! Years outside `0000..=9999` carry an explicit sign (`+12345-01-01`).

use crate::descriptor::TemporalKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// A temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Instant(DateTime<Utc>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Duration(TimeDelta),
}

impl Temporal {
    /// Kind of this value.
    pub fn kind(&self) -> TemporalKind {
        match self {
            Self::Instant(_) => TemporalKind::Instant,
            Self::Date(_) => TemporalKind::Date,
            Self::DateTime(_) => TemporalKind::DateTime,
            Self::Time(_) => TemporalKind::Time,
            Self::Duration(_) => TemporalKind::Duration,
        }
    }
}

impl From<DateTime<Utc>> for Temporal {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Instant(v)
    }
}

impl From<NaiveDate> for Temporal {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<NaiveTime> for Temporal {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<TimeDelta> for Temporal {
    fn from(v: TimeDelta) -> Self {
        Self::Duration(v)
    }
}

/// Canonical text adapter for one temporal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemporalAdapter {
    kind: TemporalKind,
}

impl TemporalAdapter {
    /// Create an adapter for `kind`.
    pub const fn new(kind: TemporalKind) -> Self {
        Self { kind }
    }

    /// Handled kind.
    pub fn kind(&self) -> TemporalKind {
        self.kind
    }

    /// Render `value` canonically. Returns `None` if `value` has another kind.
    pub fn format(&self, value: &Temporal) -> Option<String> {
        if value.kind() != self.kind {
            return None;
        }
        Some(format_temporal(value))
    }

    /// Strictly parse `text`. Returns `None` unless `text` is canonical.
    pub fn parse(&self, text: &str) -> Option<Temporal> {
        let parsed = match self.kind {
            TemporalKind::Instant => text
                .strip_suffix('Z')
                .and_then(|naive| NaiveDateTime::parse_from_str(naive, DATE_TIME_FORMAT).ok())
                .map(|naive| Temporal::Instant(naive.and_utc())),
            TemporalKind::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(Temporal::Date),
            TemporalKind::DateTime => NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
                .ok()
                .map(Temporal::DateTime),
            TemporalKind::Time => NaiveTime::parse_from_str(text, TIME_FORMAT)
                .ok()
                .map(Temporal::Time),
            TemporalKind::Duration => parse_duration(text).map(Temporal::Duration),
        }?;
        (format_temporal(&parsed) == text).then_some(parsed)
    }
}

fn format_temporal(value: &Temporal) -> String {
    match value {
        Temporal::Instant(dt) => format!("{}Z", dt.naive_utc().format(DATE_TIME_FORMAT)),
        Temporal::Date(d) => d.format(DATE_FORMAT).to_string(),
        Temporal::DateTime(dt) => dt.format(DATE_TIME_FORMAT).to_string(),
        Temporal::Time(t) => t.format(TIME_FORMAT).to_string(),
        Temporal::Duration(d) => format_duration(*d),
    }
}

fn format_duration(delta: TimeDelta) -> String {
    let negative = delta < TimeDelta::zero();
    let magnitude = delta.abs();
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut out = String::with_capacity(16);
    if negative {
        out.push('-');
    }
    out.push_str("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds > 0 || nanos > 0 || (hours == 0 && minutes == 0) {
        out.push_str(&seconds.to_string());
        if nanos > 0 {
            out.push('.');
            out.push_str(&fraction_digits(nanos));
        }
        out.push('S');
    }
    out
}

/// Fraction in groups of three digits (millis, micros or nanos).
fn fraction_digits(nanos: i32) -> String {
    if nanos % 1_000_000 == 0 {
        format!("{:03}", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!("{:06}", nanos / 1_000)
    } else {
        format!("{:09}", nanos)
    }
}

fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut rest = rest.strip_prefix("PT")?;
    let mut seconds: i64 = 0;
    let mut nanos: u32 = 0;
    // Units must appear in H, M, S order, each at most once.
    let mut next_unit = 0;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let whole: i64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let mut fraction = None;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            if frac_len == 0 || frac_len > 9 {
                return None;
            }
            let raw: u32 = after_dot[..frac_len].parse().ok()?;
            fraction = Some(raw * 10u32.pow(9 - frac_len as u32));
            rest = &after_dot[frac_len..];
        }

        let unit = rest.chars().next()?;
        rest = &rest[unit.len_utf8()..];
        let (order, factor) = match unit {
            'H' => (1, 3600),
            'M' => (2, 60),
            'S' => (3, 1),
            _ => return None,
        };
        if order <= next_unit || (fraction.is_some() && unit != 'S') {
            return None;
        }
        next_unit = order;
        seconds = seconds.checked_add(whole.checked_mul(factor)?)?;
        if let Some(frac) = fraction {
            nanos = frac;
        }
    }
    if next_unit == 0 {
        return None;
    }

    let delta = TimeDelta::new(seconds, nanos)?;
    Some(if negative { -delta } else { delta })
}
