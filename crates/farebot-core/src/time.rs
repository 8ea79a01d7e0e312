// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock parsing and formatting as minutes since midnight.

/// Parse a `H:MM` or `HH:MM` clock value into minutes since midnight.
///
/// Returns `None` for any other shape, and for out-of-range values
/// (hour > 23 or minute > 59). `None` is a "no match" sentinel, not an
/// error: callers re-prompt or skip the value.
pub fn parse_clock(text: &str) -> Option<u16> {
    let (hour, minute) = text.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().all(|b| b.is_ascii_digit()) || !minute.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u16 = hour.parse().ok()?;
    let minute: u16 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(hour * 60 + minute)
}

/// Format minutes since midnight as a zero-padded `HH:MM` string.
pub fn format_clock(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
