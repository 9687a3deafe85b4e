// Copyright 2024-2025 Andres Morey
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parses syslog-style `MMM dD HH:MM:SS` timestamps into seconds-of-range
//! integers, and parses the lenient `H[:M[:S]]` search-time syntax accepted
//! on the command line.

use crate::error::TimeCodecError;

/// Number of seconds in a calendar day; added to a log time's
/// seconds-of-range value whenever the line's day-of-month differs from
/// the log's first observed day.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Structural check of a log line's leading bytes against
/// `MMM dD HH:MM:SS`. Does not validate that the digits form sane
/// calendar values (e.g. `HH` up to 99 passes); only the shape matters,
/// matching the original's forgiving `is_valid_log_time`.
pub fn is_valid_log_line(bytes: &[u8]) -> bool {
    if bytes.len() < 15 {
        return false;
    }

    let is_char = |b: u8| (b | 0x20).is_ascii_lowercase();
    let is_num = |b: u8| b.is_ascii_digit();
    let is_space = |b: u8| b == b' ';

    is_char(bytes[0])
        && is_char(bytes[1])
        && is_char(bytes[2])
        && is_space(bytes[3])
        && (is_space(bytes[4]) || is_num(bytes[4]))
        && is_num(bytes[5])
        && is_space(bytes[6])
        && is_num(bytes[7])
        && is_num(bytes[8])
        && bytes[9] == b':'
        && is_num(bytes[10])
        && is_num(bytes[11])
        && bytes[12] == b':'
        && is_num(bytes[13])
        && is_num(bytes[14])
}

/// Reads the two day-of-month digit columns (bytes 4 and 5 of a log
/// line). Byte 4 may be a space for single-digit days.
pub fn parse_day_of_month(bytes: &[u8]) -> Result<u32, TimeCodecError> {
    if bytes.len() < 6 {
        return Err(TimeCodecError::NotATimestamp);
    }

    let mut day = 0u32;
    if bytes[4].is_ascii_digit() {
        day = u32::from(bytes[4] - b'0') * 10;
    }

    if bytes[5].is_ascii_digit() {
        day += u32::from(bytes[5] - b'0');
        Ok(day)
    } else {
        Err(TimeCodecError::NotATimestamp)
    }
}

fn two_digit(bytes: &[u8], idx: usize) -> Result<u32, TimeCodecError> {
    let (a, b) = (bytes[idx], bytes[idx + 1]);
    if a.is_ascii_digit() && b.is_ascii_digit() {
        Ok(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
    } else {
        Err(TimeCodecError::NotATimestamp)
    }
}

/// Parses a log line's timestamp into seconds-of-range, adding one day's
/// worth of seconds whenever the line's day-of-month doesn't match
/// `day_start`. Monotonic across exactly one midnight crossing; behavior
/// beyond that is unspecified (see the crate's non-goals).
pub fn parse_log_time(bytes: &[u8], day_start: u32) -> Result<i64, TimeCodecError> {
    if bytes.len() < 15 {
        return Err(TimeCodecError::NotATimestamp);
    }

    let day = parse_day_of_month(bytes)?;
    let hh = two_digit(bytes, 7)?;
    let mm = two_digit(bytes, 10)?;
    let ss = two_digit(bytes, 13)?;

    let mut seconds = i64::from(hh) * 3600 + i64::from(mm) * 60 + i64::from(ss);
    if day != day_start {
        seconds += SECONDS_PER_DAY;
    }
    Ok(seconds)
}

/// Parses a single `H`, `H:M`, or `H:M:S` search-time field. Absent or
/// empty trailing fields (e.g. a trailing `:` with nothing after it)
/// fall back to `pad`, matching the original's `strtok`-based parsing,
/// which skips empty tokens entirely; present-and-unparseable fields
/// fall back to `0`, matching `atoi`'s behavior in the original C.
pub fn parse_search_time(text: &str, pad: i64) -> i64 {
    let mut fields = text.split(':').filter(|f| !f.trim().is_empty());

    let h = fields.next().map_or(0, |f| f.trim().parse().unwrap_or(0));
    let m = fields.next().map_or(pad, |f| f.trim().parse().unwrap_or(0));
    let s = fields.next().map_or(pad, |f| f.trim().parse().unwrap_or(0));

    h * 3600 + m * 60 + s
}

/// Expands a user-supplied range argument (`A-B`, or a bare `A`) into a
/// `(start, end)` pair of seconds-of-range values.
pub fn parse_search_range(text: &str) -> (i64, i64) {
    if let Some((a, b)) = text.split_once('-') {
        (parse_search_time(a, 0), parse_search_time(b, 59))
    } else {
        (parse_search_time(text, 0), parse_search_time(text, 59))
    }
}

/// Lenient structural check used to decide whether a command-line
/// argument looks like a search time at all: digits, at most one
/// hyphen, at most four colons, at most twelve digits.
pub fn is_valid_search_time(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let mut digit_count = 0;
    let mut colon_count = 0;
    let mut hyphen_count = 0;

    for c in text.chars() {
        match c {
            '0'..='9' => digit_count += 1,
            ':' => colon_count += 1,
            '-' => hyphen_count += 1,
            _ => return false,
        }
    }

    hyphen_count <= 1 && colon_count <= 4 && digit_count <= 12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_log_line_two_digit_day() {
        assert!(is_valid_log_line(b"Jan 15 12:00:00 x"));
    }

    #[test]
    fn valid_log_line_one_digit_day() {
        assert!(is_valid_log_line(b"Jan  5 12:00:00 x"));
    }

    #[test]
    fn invalid_log_line_too_short() {
        assert!(!is_valid_log_line(b"Jan 15 12:0"));
    }

    #[test]
    fn invalid_log_line_bad_month() {
        assert!(!is_valid_log_line(b"123 15 12:00:00 x"));
    }

    #[test]
    fn invalid_log_line_missing_colon() {
        assert!(!is_valid_log_line(b"Jan 15 12-00:00 x"));
    }

    #[test]
    fn day_of_month_two_digit() {
        assert_eq!(parse_day_of_month(b"Jan 15 12:00:00").unwrap(), 15);
    }

    #[test]
    fn day_of_month_one_digit_padded() {
        assert_eq!(parse_day_of_month(b"Jan  5 12:00:00").unwrap(), 5);
    }

    #[test]
    fn log_time_same_day() {
        let t = parse_log_time(b"Jan  1 12:00:05 x", 1).unwrap();
        assert_eq!(t, 12 * 3600 + 5);
    }

    #[test]
    fn log_time_second_day_adds_seconds_per_day() {
        let t = parse_log_time(b"Jan  2 00:00:05 x", 1).unwrap();
        assert_eq!(t, SECONDS_PER_DAY + 5);
    }

    #[test]
    fn log_time_rejects_malformed_line() {
        assert_eq!(
            parse_log_time(b"garbage", 1),
            Err(TimeCodecError::NotATimestamp)
        );
    }

    #[test]
    fn search_time_hour_only_pads_minute_and_second() {
        assert_eq!(parse_search_time("6", 0), 6 * 3600);
        assert_eq!(parse_search_time("6", 59), 6 * 3600 + 59 * 60 + 59);
    }

    #[test]
    fn search_time_hour_and_minute() {
        assert_eq!(parse_search_time("6:30", 59), 6 * 3600 + 30 * 60 + 59);
    }

    #[test]
    fn search_time_full() {
        assert_eq!(parse_search_time("6:30:15", 0), 6 * 3600 + 30 * 60 + 15);
    }

    #[test]
    fn search_time_trailing_empty_field_falls_back_to_pad() {
        assert_eq!(parse_search_time("6:", 59), 6 * 3600 + 59 * 60 + 59);
    }

    #[test]
    fn search_range_with_hyphen() {
        assert_eq!(
            parse_search_range("6-8"),
            (6 * 3600, 8 * 3600 + 59 * 60 + 59)
        );
    }

    #[test]
    fn search_range_bare_expands_both_ways() {
        // A fully-specified time never consults `pad` in either half, so
        // a bare (non-hyphenated) argument expands to the same instant
        // twice rather than a one-minute window.
        let t = 12 * 3600 + 13 * 60 + 16;
        assert_eq!(parse_search_range("12:13:16"), (t, t));
    }

    #[test]
    fn valid_search_time_accepts_typical_forms() {
        assert!(is_valid_search_time("12:13:16-14:32:44"));
        assert!(is_valid_search_time("6"));
    }

    #[test]
    fn valid_search_time_rejects_junk() {
        assert!(!is_valid_search_time("-----:::::0000000000000000000000:::::------"));
        assert!(!is_valid_search_time("12:13:16a"));
        assert!(!is_valid_search_time(""));
    }
}
