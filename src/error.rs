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

use std::io;

use thiserror::Error;

/// Errors raised while parsing a timestamp out of a log line or a
/// command-line search string.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TimeCodecError {
    #[error("line does not start with a valid log timestamp")]
    NotATimestamp,
}

/// Errors raised opening and bootstrapping a log file.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("could not open log file: {0}")]
    Io(#[from] io::Error),

    #[error("first line of log is not a valid timestamp")]
    InvalidFirstLine,

    #[error("log file is empty")]
    EmptyFile,
}

/// Errors the locator can surface. `NotFound` is the expected,
/// non-fatal outcome of a query that falls outside the confirmed
/// region of the map; `Io` only occurs on a failed sample read.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("no confirmed offset for the requested time")]
    NotFound,

    #[error("error sampling log file: {0}")]
    Io(#[from] io::Error),
}

/// Top-level error type returned from `main`.
#[derive(Debug, Error)]
pub enum TgrepError {
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error("error accessing map directory: {0}")]
    MapDir(#[from] io::Error),
}
