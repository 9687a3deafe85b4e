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

//! `tgrep`: a time-range grep for syslog-style log files.
//!
//! The library crate holds the time-indexed offset locator -- the time
//! codec, the persisted time map, the file sampler, and the locator
//! driving them -- plus the ambient CLI, config, and output layers that
//! turn it into the `tgrep` binary.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod locator;
pub mod output;
pub mod sampler;
pub mod time_codec;
pub mod time_map;

pub use context::LogFileContext;
pub use error::{LocatorError, OpenError, TgrepError};
pub use time_map::{MapEntry, TimeMap};
