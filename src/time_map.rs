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

//! The time-indexed map of observed seconds to byte ranges. Backed by a
//! `BTreeMap` rather than the original's singly-linked list: both satisfy
//! the "ordered, one entry per second" contract, but the tree gives
//! `O(log n)` bracket lookups instead of an `O(n)` walk.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

/// One observed second: the best-known starting/ending byte offsets and
/// whether each has been proven (rather than merely the tightest bound
/// seen so far).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub time: i64,
    pub start_off: i64,
    pub end_off: i64,
    pub start_confirmed: bool,
    pub end_confirmed: bool,
}

impl MapEntry {
    fn new(time: i64) -> Self {
        Self {
            time,
            start_off: -1,
            end_off: -1,
            start_confirmed: false,
            end_confirmed: false,
        }
    }

    fn checksum(&self) -> i64 {
        self.time
            + self.start_off
            + i64::from(self.start_confirmed)
            + self.end_off
            + i64::from(self.end_confirmed)
    }

    fn to_line(self) -> String {
        format!(
            "{} {} {} {} {} {}\n",
            self.time,
            self.start_off,
            i64::from(self.start_confirmed),
            self.end_off,
            i64::from(self.end_confirmed),
            self.checksum(),
        )
    }

    fn from_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let time: i64 = fields.next()?.parse().ok()?;
        let start_off: i64 = fields.next()?.parse().ok()?;
        let start_confirmed: i64 = fields.next()?.parse().ok()?;
        let end_off: i64 = fields.next()?.parse().ok()?;
        let end_confirmed: i64 = fields.next()?.parse().ok()?;
        let checksum: i64 = fields.next()?.parse().ok()?;

        if time + start_off + start_confirmed + end_off + end_confirmed != checksum {
            return None;
        }

        Some(Self {
            time,
            start_off,
            end_off,
            start_confirmed: start_confirmed != 0,
            end_confirmed: end_confirmed != 0,
        })
    }
}

/// Ordered collection of [`MapEntry`] keyed by `time`, with at most one
/// entry per second.
#[derive(Debug, Default)]
pub struct TimeMap {
    entries: BTreeMap<i64, MapEntry>,
}

impl TimeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `time`, creating it (with unknown offsets
    /// and unconfirmed bits) if it does not already exist.
    pub fn get_or_create(&mut self, time: i64) -> &mut MapEntry {
        self.entries.entry(time).or_insert_with(|| MapEntry::new(time))
    }

    pub fn find_exact(&self, time: i64) -> Option<&MapEntry> {
        self.entries.get(&time)
    }

    /// The greatest entry with `time' < time`, strictly.
    pub fn find_prev(&self, time: i64) -> Option<&MapEntry> {
        self.entries.range(..time).next_back().map(|(_, e)| e)
    }

    /// The least entry with `time' > time`, strictly.
    pub fn find_next(&self, time: i64) -> Option<&MapEntry> {
        self.entries.range(time + 1..).next().map(|(_, e)| e)
    }

    pub fn min_time(&self) -> Option<i64> {
        self.entries.keys().next().copied()
    }

    pub fn max_time(&self) -> Option<i64> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapEntry> {
        self.entries.values()
    }

    /// Writes one checksummed line per entry. A short write on any one
    /// line is not treated as fatal by callers: the affected line will
    /// simply fail its checksum on the next load.
    pub fn save_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for entry in self.entries.values() {
            w.write_all(entry.to_line().as_bytes())?;
        }
        Ok(())
    }

    /// Reads entries back from a checksummed map file. Lines that fail
    /// the checksum, or are otherwise malformed, are silently skipped;
    /// the rest of the file is still consumed.
    pub fn load_from<R: BufRead>(r: R) -> io::Result<Self> {
        let mut map = Self::new();
        for line in r.lines() {
            let line = line?;
            if let Some(entry) = MapEntry::from_line(&line) {
                map.entries.insert(entry.time, entry);
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_inserts_fresh_entry() {
        let mut map = TimeMap::new();
        let e = map.get_or_create(100);
        assert_eq!(e.start_off, -1);
        assert_eq!(e.end_off, -1);
        assert!(!e.start_confirmed);
        assert!(!e.end_confirmed);
    }

    #[test]
    fn get_or_create_returns_existing_entry() {
        let mut map = TimeMap::new();
        map.get_or_create(100).start_off = 42;
        assert_eq!(map.get_or_create(100).start_off, 42);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn find_prev_and_next_are_strict() {
        let mut map = TimeMap::new();
        map.get_or_create(10);
        map.get_or_create(20);
        map.get_or_create(30);

        assert_eq!(map.find_prev(20).unwrap().time, 10);
        assert_eq!(map.find_next(20).unwrap().time, 30);
        assert!(map.find_prev(10).is_none());
        assert!(map.find_next(30).is_none());
    }

    #[test]
    fn min_max_time() {
        let mut map = TimeMap::new();
        map.get_or_create(50);
        map.get_or_create(10);
        map.get_or_create(90);
        assert_eq!(map.min_time(), Some(10));
        assert_eq!(map.max_time(), Some(90));
    }

    #[test]
    fn round_trip_save_and_load() {
        let mut map = TimeMap::new();
        {
            let e = map.get_or_create(43200);
            e.start_off = 0;
            e.start_confirmed = true;
            e.end_off = 219;
            e.end_confirmed = true;
        }
        map.get_or_create(43201);

        let mut buf = Vec::new();
        map.save_to(&mut buf).unwrap();

        let reloaded = TimeMap::load_from(io::Cursor::new(buf)).unwrap();
        assert_eq!(reloaded.find_exact(43200), map.find_exact(43200));
        assert_eq!(reloaded.find_exact(43201), map.find_exact(43201));
    }

    #[test]
    fn load_skips_corrupt_lines_but_keeps_others() {
        let input = "100 0 1 10 1 112\n200 5 0 5 bogus\n300 0 1 5 1 306\n";
        let map = TimeMap::load_from(io::Cursor::new(input)).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.find_exact(100).is_some());
        assert!(map.find_exact(200).is_none());
        assert!(map.find_exact(300).is_some());
    }

    #[test]
    fn load_skips_line_with_bad_checksum() {
        let input = "100 0 1 10 1 999\n";
        let map = TimeMap::load_from(io::Cursor::new(input)).unwrap();
        assert!(map.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn stays_sorted_and_deduplicated(times in proptest::collection::vec(0i64..100_000, 0..200)) {
            let mut map = TimeMap::new();
            for t in &times {
                map.get_or_create(*t);
            }

            let collected: Vec<i64> = map.iter().map(|e| e.time).collect();
            let mut sorted = collected.clone();
            sorted.sort_unstable();
            sorted.dedup();

            prop_assert_eq!(collected.clone(), sorted);

            let mut unique = times.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(collected.len(), unique.len());
        }
    }
}
