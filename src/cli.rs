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

//! Command-line argument parsing: a positional time range, an optional
//! log path, and verbosity flags, mirroring the original's lenient
//! `is_valid_search_time` check as a `clap` value parser.

use std::path::PathBuf;

use clap::Parser;

use crate::time_codec;

/// Time-range grep for syslog-style log files.
#[derive(Parser, Debug)]
#[command(version, about = "Time-range grep for syslog-style log files")]
pub struct Cli {
    /// Time or time range to search for, e.g. `12`, `12:30`, or
    /// `12:30:00-14:00:00`. Defaults to the whole file.
    #[arg(value_parser = parse_search_time_arg)]
    pub time: Option<String>,

    /// Path to the log file. Defaults to `/logs/haproxy.log`.
    pub path: Option<PathBuf>,

    /// Raise the logging level to info.
    #[arg(short, long)]
    pub verbose: bool,

    /// Raise the logging level to debug.
    #[arg(short, long)]
    pub debug: bool,
}

/// Rejects a `TIME` argument that doesn't look like a search time at
/// all, per [`time_codec::is_valid_search_time`], with a clap-style
/// usage error rather than letting it silently degrade at parse time.
fn parse_search_time_arg(s: &str) -> Result<String, String> {
    if time_codec::is_valid_search_time(s) {
        Ok(s.to_string())
    } else {
        Err(format!("`{s}` is not a valid search time (expected H[:M[:S]][-H[:M[:S]]])"))
    }
}
