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

//! Owns the open log file handle together with everything derived from
//! it: the day the file starts on, its length, and the time map built up
//! by sampling it. The original kept this state behind a handful of
//! module-level statics; here it is one struct so a caller can open more
//! than one log file in a process (tests do exactly that).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::info;

use crate::error::OpenError;
use crate::time_codec;
use crate::time_map::TimeMap;

pub struct LogFileContext {
    pub(crate) file: File,
    pub(crate) file_len: u64,
    pub(crate) day_start: u32,
    pub(crate) map: TimeMap,
    first_line: Vec<u8>,
    mtime: i64,
}

impl LogFileContext {
    /// Opens `path`, checks that it starts with a parseable log
    /// timestamp, and bootstraps the time map with entries for the
    /// start and end of the file.
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        let file_len = metadata.len();
        if file_len == 0 {
            return Err(OpenError::EmptyFile);
        }

        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let mut first_window = vec![0u8; crate::sampler::WINDOW_SIZE];
        file.seek(SeekFrom::Start(0))?;
        let n = file.read(&mut first_window)?;
        first_window.truncate(n);

        if !time_codec::is_valid_log_line(&first_window) {
            return Err(OpenError::InvalidFirstLine);
        }
        let day_start = time_codec::parse_day_of_month(&first_window)
            .map_err(|_| OpenError::InvalidFirstLine)?;

        let first_line_len = first_window
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(first_window.len());
        let first_line = first_window[..first_line_len].to_vec();

        let mut ctx = Self {
            file,
            file_len,
            day_start,
            map: TimeMap::new(),
            first_line,
            mtime,
        };

        ctx.ingest_window_center(0)?;
        ctx.ingest_window_center(file_len.saturating_sub(1))?;

        info!(path = %path.display(), "opened log file");
        Ok(ctx)
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn start_time(&self) -> Option<i64> {
        self.map.min_time()
    }

    pub fn end_time(&self) -> Option<i64> {
        self.map.max_time()
    }

    /// A mostly-unique identifier for this exact file: the digits found
    /// in its first line, concatenated, followed by its modification
    /// time. Used as the persisted time map's file name.
    pub fn fingerprint(&self) -> String {
        let mut digits: i64 = 0;
        for &b in &self.first_line {
            if b.is_ascii_digit() {
                digits = digits.wrapping_mul(10) + i64::from(b - b'0');
            }
        }
        format!(".{}{}.map", digits, self.mtime)
    }

    /// Overwrites entries with ones loaded from a persisted map file.
    /// Loaded data always wins over whatever bootstrap sampling found,
    /// mirroring the load-after-bootstrap ordering of the original tool.
    pub fn merge_loaded(&mut self, loaded: TimeMap) {
        for entry in loaded.iter() {
            *self.map.get_or_create(entry.time) = *entry;
        }
    }

    /// The path of this file's persisted map inside `map_dir`, named
    /// after its [`fingerprint`](Self::fingerprint).
    pub fn map_path(&self, map_dir: &Path) -> std::path::PathBuf {
        map_dir.join(self.fingerprint())
    }

    /// Loads and merges a persisted map from `map_dir` if one matching
    /// this file's fingerprint exists. A missing file is not an error;
    /// any other I/O failure is propagated.
    pub fn load_map(&mut self, map_dir: &Path) -> std::io::Result<()> {
        let path = self.map_path(map_dir);
        match File::open(&path) {
            Ok(f) => {
                let loaded = TimeMap::load_from(std::io::BufReader::new(f))?;
                info!(path = %path.display(), entries = loaded.len(), "loaded persisted time map");
                self.merge_loaded(loaded);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Writes the current time map to `map_dir`, creating or truncating
    /// the file named after this log's fingerprint.
    pub fn save_map(&self, map_dir: &Path) -> std::io::Result<()> {
        let path = self.map_path(map_dir);
        let mut f = File::create(&path)?;
        self.map.save_to(&mut f)?;
        info!(path = %path.display(), entries = self.map.len(), "saved time map");
        Ok(())
    }
}
