// Conversion between the contest clock (time remaining, "MM:SS") and the
// elapsed time since the start of the session.

use crate::ParseError;

/// Length of one contest session in seconds.
pub const SESSION_SECONDS: u32 = 60 * 60;

/// Parse a "MM:SS" time-remaining value into seconds remaining.
///
/// Seconds are not range checked, so "10:75" is 675 seconds.
pub fn parse_time_remaining(value: &str) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidTime(value.to_string());
    let (minutes, seconds) = value.split_once(':').ok_or_else(invalid)?;
    let minutes = parse_unsigned(minutes).ok_or_else(invalid)?;
    let seconds = parse_unsigned(seconds).ok_or_else(invalid)?;
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Plain base-10 digits with optional surrounding whitespace; no sign.
pub(crate) fn parse_unsigned(value: &str) -> Option<u32> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Seconds elapsed since the session started, given the seconds remaining.
///
/// Goes negative if more than a full session was left on the clock.
pub fn elapsed_from_remaining(remaining_s: u32) -> i64 {
    i64::from(SESSION_SECONDS) - i64::from(remaining_s)
}

/// Parse a "MM:SS" time-remaining value straight into elapsed seconds.
pub fn parse_elapsed(value: &str) -> Result<i64, ParseError> {
    parse_time_remaining(value).map(elapsed_from_remaining)
}
