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

//! Streams a confirmed `[start, end]` byte range of the log out to a
//! writer (stdout in `main`), in fixed-size chunks sized to the
//! sampler's window.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::context::LogFileContext;
use crate::sampler::WINDOW_SIZE;

/// Copies bytes `[start, end]` (inclusive) of the log to `out`. A
/// malformed range (`start > end`, or either endpoint past the file)
/// is logged at debug and silently skipped -- a failed sub-query never
/// aborts the run.
pub fn dump_range(ctx: &mut LogFileContext, start: u64, end: u64, out: &mut impl Write) -> io::Result<()> {
    if start > end || end >= ctx.file_len() {
        debug!(start, end, file_len = ctx.file_len(), "skipping invalid byte range");
        return Ok(());
    }

    let mut remaining = end - start + 1;
    ctx.seek_for_dump(SeekFrom::Start(start))?;

    let mut buf = vec![0u8; WINDOW_SIZE];
    while remaining > 0 {
        let want = remaining.min(WINDOW_SIZE as u64) as usize;
        let n = ctx.read_for_dump(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        remaining -= n as u64;
    }

    Ok(())
}

impl LogFileContext {
    fn seek_for_dump(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn read_for_dump(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

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
    fn dump_range_copies_inclusive_byte_range() {
        let f = write_log(&["Jan  1 12:00:00 a", "Jan  1 12:00:01 b"]);
        let mut ctx = LogFileContext::open(f.path()).unwrap();
        let mut out = Vec::new();
        dump_range(&mut ctx, 0, 18, &mut out).unwrap();
        assert_eq!(out, b"Jan  1 12:00:00 a\n");
    }

    #[test]
    fn dump_range_skips_invalid_range_silently() {
        let f = write_log(&["Jan  1 12:00:00 a"]);
        let mut ctx = LogFileContext::open(f.path()).unwrap();
        let mut out = Vec::new();
        dump_range(&mut ctx, 10, 5, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn dump_range_skips_out_of_bounds_end() {
        let f = write_log(&["Jan  1 12:00:00 a"]);
        let mut ctx = LogFileContext::open(f.path()).unwrap();
        let mut out = Vec::new();
        dump_range(&mut ctx, 0, 10_000, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
