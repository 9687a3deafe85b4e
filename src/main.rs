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

use std::io::stdout;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};

use tgrep::cli::Cli;
use tgrep::config::{self, AppConfig};
use tgrep::time_codec::SECONDS_PER_DAY;
use tgrep::LogFileContext;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    let shutdown_requested = Arc::new(AtomicBool::new(false));
    if let Err(e) = install_signal_handler(Arc::clone(&shutdown_requested)) {
        warn!(error = %e, "failed to install signal handler, continuing without one");
    }

    match run(&config, &shutdown_requested) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tgrep: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Registers a `SIGINT`/`SIGTERM` handler that flips `shutdown_requested`
/// rather than terminating the process directly: the in-progress query
/// (short, non-blocking on external input) is allowed to finish and the
/// map is flushed before exit, checked between queries in [`run`].
fn install_signal_handler(flag: Arc<AtomicBool>) -> Result<(), std::io::Error> {
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, flag)?;
    Ok(())
}

fn run(config: &AppConfig, shutdown_requested: &AtomicBool) -> Result<(), tgrep::TgrepError> {
    config::ensure_map_dir(&config.map_dir)?;

    let mut ctx = LogFileContext::open(&config.log_path)?;
    if let Err(e) = ctx.load_map(&config.map_dir) {
        warn!(error = %e, "failed to load persisted time map, continuing without it");
    }

    let (min, max) = (
        ctx.start_time().unwrap_or(0),
        ctx.end_time().unwrap_or(0),
    );
    let (req_start, req_end) = config.range.unwrap_or((min, max));

    let mut out = stdout().lock();

    // Duration is always taken non-negative: a request like `22-2` wraps
    // past midnight, so pull the end forward by a day's worth of seconds
    // until it's no longer behind the start.
    let mut duration = req_end - req_start;
    while duration < 0 {
        duration += SECONDS_PER_DAY;
    }
    let req_end = req_start + duration;

    // The second search always covers the day-2 portion of the log, shifted
    // a full day past the first; whether it actually overlaps the file is
    // decided purely by the post-clamp `s <= e` check below, same as the
    // first search -- it is not gated on whether the original request
    // wrapped midnight, since a log may span two calendar days even when
    // the requested range does not.
    let second_start = req_start + SECONDS_PER_DAY;
    let second_end = second_start + duration;

    let (s, e) = (req_start.clamp(min, max), req_end.clamp(min, max));
    if s <= e {
        run_query(&mut ctx, s, e, &mut out);
    }

    let (s2, e2) = (second_start.clamp(min, max), second_end.clamp(min, max));
    if s2 <= e2 {
        run_query(&mut ctx, s2, e2, &mut out);
    }

    if shutdown_requested.load(Ordering::Relaxed) {
        info!("shutdown requested, flushing time map before exit");
    }

    if let Err(e) = ctx.save_map(&config.map_dir) {
        warn!(error = %e, "failed to save time map");
    }

    Ok(())
}

fn run_query(ctx: &mut LogFileContext, start: i64, end: i64, out: &mut impl std::io::Write) {
    let start_off = match ctx.find_start(start) {
        Ok(off) => off,
        Err(e) => {
            debug!(time = start, error = %e, "find_start failed");
            return;
        }
    };
    let end_off = match ctx.find_end(end) {
        Ok(off) => off,
        Err(e) => {
            debug!(time = end, error = %e, "find_end failed");
            return;
        }
    };

    if let Err(e) = tgrep::output::dump_range(ctx, start_off, end_off, out) {
        warn!(error = %e, "failed writing matched range to stdout");
    }
}
