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

//! Reads fixed-size windows of a log file and folds every complete
//! timestamped line found in a window into the time map. A predicted
//! byte offset lands roughly mid-window, so a single read usually shows
//! lines both before and after the prediction -- the raw material the
//! boundary-confirmation rule needs to prove a transition.

use std::io::{Read, Seek, SeekFrom};

use tracing::trace;

use crate::context::LogFileContext;
use crate::time_codec;

/// Size of the reusable byte window read per sample.
pub const WINDOW_SIZE: usize = 4096;

impl LogFileContext {
    /// Positions a window of up to [`WINDOW_SIZE`] bytes starting at
    /// `off` (clamped to the file length) and folds every timestamped
    /// line it contains into the time map.
    pub fn ingest_window(&mut self, off: u64) -> std::io::Result<()> {
        let win_start = off.min(self.file_len);
        self.file.seek(SeekFrom::Start(win_start))?;

        let mut buf = vec![0u8; WINDOW_SIZE];
        let n = self.file.read(&mut buf)?;
        buf.truncate(n);
        let win_end = win_start + n as u64;

        trace!(win_start, win_end, "sampled window");
        self.ingest_buf(&buf, win_start);
        Ok(())
    }

    /// Shifts `off` left by half a window (clamped at zero) and ingests
    /// the window starting there, so a predicted offset sits near the
    /// middle of what gets read.
    pub fn ingest_window_center(&mut self, off: u64) -> std::io::Result<()> {
        let start = off.saturating_sub(WINDOW_SIZE as u64 / 2);
        self.ingest_window(start)
    }

    fn ingest_buf(&mut self, buf: &[u8], win_start: u64) {
        let mut p = 0usize;
        let mut prev_time: Option<i64> = None;

        while p < buf.len() {
            let abs_p = win_start + p as u64;
            let newline_rel = buf[p..].iter().position(|&b| b == b'\n').map(|i| p + i);

            if time_codec::is_valid_log_line(&buf[p..]) {
                if let Ok(t) = time_codec::parse_log_time(&buf[p..], self.day_start) {
                    // Position of the newline terminating this line, clamped to
                    // the window end when the line runs off the end of the
                    // buffer without one.
                    let abs_line_end = win_start + newline_rel.unwrap_or(buf.len()) as u64;

                    {
                        let entry = self.map.get_or_create(t);
                        if entry.start_off == -1 || (abs_p as i64) < entry.start_off {
                            entry.start_off = abs_p as i64;
                            if abs_p == 0 {
                                entry.start_confirmed = true;
                            }
                        }
                        if (abs_line_end as i64) > entry.end_off {
                            entry.end_off = abs_line_end as i64;
                            if abs_line_end == self.file_len.saturating_sub(1) {
                                entry.end_confirmed = true;
                            }
                        }
                    }

                    if let Some(prev_t) = prev_time {
                        if prev_t != t {
                            self.map.get_or_create(prev_t).end_confirmed = true;
                            self.map.get_or_create(t).start_confirmed = true;
                        }
                    }
                    prev_time = Some(t);

                    match newline_rel {
                        Some(rel) => {
                            p = rel + 1;
                            continue;
                        }
                        None => break,
                    }
                }
            }

            match newline_rel {
                Some(rel) => p = rel + 1,
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_log(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for line in lines {
            write!(f, "{line}\n").unwrap();
        }
        f.flush().unwrap();
        f
    }

    #[test]
    fn ingest_confirms_boundary_between_distinct_times() {
        let f = write_log(&[
            "Jan  1 12:00:00 a",
            "Jan  1 12:00:00 b",
            "Jan  1 12:00:01 c",
        ]);
        let ctx = LogFileContext::open(f.path()).unwrap();

        let e0 = ctx.map.find_exact(12 * 3600).unwrap();
        assert!(e0.end_confirmed);
        let e1 = ctx.map.find_exact(12 * 3600 + 1).unwrap();
        assert!(e1.start_confirmed);
    }

    #[test]
    fn ingest_confirms_start_at_file_beginning() {
        let f = write_log(&["Jan  1 12:00:00 a"]);
        let ctx = LogFileContext::open(f.path()).unwrap();
        let e = ctx.map.find_exact(12 * 3600).unwrap();
        assert_eq!(e.start_off, 0);
        assert!(e.start_confirmed);
    }

    #[test]
    fn ingest_confirms_end_at_file_end() {
        let f = write_log(&["Jan  1 12:00:00 a"]);
        let ctx = LogFileContext::open(f.path()).unwrap();
        let e = ctx.map.find_exact(12 * 3600).unwrap();
        assert_eq!(e.end_off, ctx.file_len() as i64 - 1);
        assert!(e.end_confirmed);
    }

    #[test]
    fn window_center_shifts_left_by_half_window_clamped_at_zero() {
        let f = write_log(&["Jan  1 12:00:00 a"]);
        let mut ctx = LogFileContext::open(f.path()).unwrap();
        // Should not panic or underflow even for a tiny file.
        ctx.ingest_window_center(10).unwrap();
    }
}
