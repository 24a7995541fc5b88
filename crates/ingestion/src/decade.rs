//! Decade-coded period labels.
//!
//! A decade label is a month (in any form [`MonthPeriod`] parses) followed by
//! a separator and a one-character sub-period code, e.g. `2021-03_3` or
//! `2021Q1_3`. Only the sub-period carrying the marker is the authoritative
//! data point of its month.

use periodic_core::{Error, MonthPeriod, Result};

/// Sub-period code of a label: its final character.
pub fn sub_period(label: &str) -> Option<char> {
    label.trim().chars().last()
}

/// Month part of a label: everything but the two trailing characters.
pub fn month_part(label: &str) -> Result<&str> {
    let t = label.trim();
    let cut = t
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
        .ok_or_else(|| Error::malformed_temporal(format!("decade label {label:?} is too short")))?;
    Ok(&t[..cut])
}

/// Month of an authoritative label, or `None` if the label's sub-period is
/// not `marker`.
///
/// Labels with another sub-period are not parsed at all.
pub fn authoritative_month(label: &str, marker: char) -> Result<Option<MonthPeriod>> {
    if sub_period(label) != Some(marker) {
        return Ok(None);
    }
    month_part(label)?.parse().map(Some)
}
