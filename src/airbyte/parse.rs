//! Parsing helpers for the timestamp and duration formats the API reports.

use anyhow::{anyhow, ensure, Context, Result};
use chrono::DateTime;

/// Parse an RFC 3339 timestamp (e.g. `2023-01-01T00:00:00Z`) to epoch seconds
pub fn rfc3339_epoch(input: &str) -> Result<i64> {
    let parsed = DateTime::parse_from_rfc3339(input)
        .with_context(|| format!("invalid timestamp {input:?}"))?;
    Ok(parsed.timestamp())
}

/// Parse an ISO-8601 duration to seconds.
///
/// Supports the `PnW` and `PnDTnHnMnS` forms with fractional components, which
/// covers everything the jobs API emits. Year/month designators are rejected:
/// they have no fixed length in seconds.
pub fn duration_seconds(input: &str) -> Result<f64> {
    let rest = input
        .strip_prefix('P')
        .ok_or_else(|| anyhow!("duration {input:?} does not start with 'P'"))?;
    ensure!(!rest.is_empty(), "duration {input:?} has no components");

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            ensure!(!time.is_empty(), "duration {input:?} has 'T' but no time components");
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut seconds = parse_components(date_part, &[('W', 604_800.0), ('D', 86_400.0)])
        .with_context(|| format!("invalid duration {input:?}"))?;
    if let Some(time) = time_part {
        seconds += parse_components(time, &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)])
            .with_context(|| format!("invalid duration {input:?}"))?;
    }
    Ok(seconds)
}

/// Parse one `P`/`T` section: number-designator pairs in declining unit order
fn parse_components(part: &str, units: &[(char, f64)]) -> Result<f64> {
    let mut total = 0.0;
    let mut number = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            number.push(ch);
            continue;
        }
        let position = units[next_unit..]
            .iter()
            .position(|&(designator, _)| designator == ch)
            .map(|offset| next_unit + offset)
            .ok_or_else(|| anyhow!("unexpected designator {ch:?}"))?;
        ensure!(!number.is_empty(), "designator {ch:?} has no value");
        let value: f64 = number
            .parse()
            .map_err(|_| anyhow!("invalid number {number:?}"))?;
        total += value * units[position].1;
        number.clear();
        next_unit = position + 1;
    }

    ensure!(number.is_empty(), "trailing value {number:?} has no designator");
    Ok(total)
}
