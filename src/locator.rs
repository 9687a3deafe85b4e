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

//! Drives the search for the first and last byte offset of a requested
//! second: consults the time map for the bracket of known times around
//! it, predicts the next sample offset by interpolation (or bisection at
//! a bracket endpoint), and repeats until the map can *confirm* an
//! answer rather than merely report its tightest guess so far.

use tracing::debug;

use crate::context::LogFileContext;
use crate::error::LocatorError;
use crate::time_map::MapEntry;

/// Whether `(prev, exact, next)` together prove a trustworthy offset, as
/// a single pure function rather than inlined at every call site --
/// this predicate is the correctness heart of the locator.
fn bracket_confirms(prev: Option<&MapEntry>, next: Option<&MapEntry>) -> bool {
    match (prev, next) {
        (Some(a), Some(b)) => a.end_confirmed && b.start_confirmed && a.end_off + 1 == b.start_off,
        _ => false,
    }
}

impl LogFileContext {
    /// Finds the byte offset of the first line at `time`, sampling the
    /// file until the time map can prove the answer.
    pub fn find_start(&mut self, time: i64) -> Result<u64, LocatorError> {
        loop {
            if let Some(off) = self.confirmed_start(time) {
                return Ok(off);
            }

            let upper = match self.map.find_exact(time).or_else(|| self.map.find_next(time)) {
                Some(e) => *e,
                None => return Err(LocatorError::NotFound),
            };

            let lower = match self.map.find_prev(time) {
                Some(e) => *e,
                None => {
                    if upper.start_off == 0 && upper.start_confirmed {
                        return Ok(0);
                    }
                    return Err(LocatorError::NotFound);
                }
            };

            let pred = predict_offset(time, &lower, &upper);
            debug!(time, pred, "sampling for find_start");
            self.ingest_window_center(pred)?;
        }
    }

    /// Finds the byte offset of the last line at `time`, by first
    /// ensuring `time + 1`'s start is resolved (which pins down where
    /// `time`'s lines end) and then reading the confirmed end offset.
    pub fn find_end(&mut self, time: i64) -> Result<u64, LocatorError> {
        match self.find_start(time + 1) {
            Ok(_) | Err(LocatorError::NotFound) => {}
            Err(e) => return Err(e),
        }
        self.confirmed_end(time).ok_or(LocatorError::NotFound)
    }

    /// Returns the start offset for `time` if the map can currently
    /// prove it, without doing any further sampling.
    pub fn confirmed_start(&self, time: i64) -> Option<u64> {
        if let Some(e) = self.map.find_exact(time) {
            return e.start_confirmed.then_some(e.start_off as u64);
        }

        let prev = self.map.find_prev(time);
        let next = self.map.find_next(time);

        if bracket_confirms(prev, next) {
            return Some(next.unwrap().start_off as u64);
        }

        if prev.is_none() {
            if let Some(b) = next {
                if b.start_off == 0 && b.start_confirmed {
                    return Some(0);
                }
            }
        }

        None
    }

    /// Returns the end offset for `time` if the map can currently prove
    /// it, mirroring [`confirmed_start`](Self::confirmed_start).
    pub fn confirmed_end(&self, time: i64) -> Option<u64> {
        if let Some(e) = self.map.find_exact(time) {
            return e.end_confirmed.then_some(e.end_off as u64);
        }

        let prev = self.map.find_prev(time);
        let next = self.map.find_next(time);

        if bracket_confirms(prev, next) {
            return Some(prev.unwrap().end_off as u64);
        }

        if next.is_none() {
            if let Some(a) = prev {
                if a.end_off == self.file_len() as i64 - 1 && a.end_confirmed {
                    return Some(a.end_off as u64);
                }
            }
        }

        None
    }
}

/// Picks the next byte offset to sample: bisecting the known byte gap
/// when `time` is an exact, unconfirmed bracket endpoint (straight
/// interpolation degenerates to a linear walk there), interpolating
/// proportionally to `time`'s position between `lower` and `upper`
/// otherwise.
fn predict_offset(time: i64, lower: &MapEntry, upper: &MapEntry) -> u64 {
    let gap = upper.start_off - lower.end_off;

    if time == upper.time {
        return (lower.end_off + gap / 2).max(0) as u64;
    }

    let span = upper.time - lower.time;
    let frac = if span == 0 {
        0.0
    } else {
        (time - lower.time) as f64 / span as f64
    };
    let pred = lower.end_off as f64 + frac * gap as f64;
    pred.max(0.0) as u64
}
