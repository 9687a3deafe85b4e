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

//! Resolves the parsed CLI flags into a ready-to-run configuration: the
//! log path, the map directory (with its `TGREP_MAP_DIR` override for
//! tests and containerized deployments), and the logging level.

use std::path::PathBuf;

use tracing::Level;

use crate::cli::Cli;
use crate::time_codec;

/// Default log file searched when no `PATH` argument is given.
pub const DEFAULT_LOG_PATH: &str = "/logs/haproxy.log";

/// Directory name (under `$HOME`) holding persisted time maps, absent
/// a `TGREP_MAP_DIR` override.
const MAP_DIR_NAME: &str = ".tgrepmapfiles";

/// Environment variable overriding the resolved map directory root.
const MAP_DIR_ENV: &str = "TGREP_MAP_DIR";

/// The fully resolved, ready-to-run configuration for one invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub log_path: PathBuf,
    pub map_dir: PathBuf,
    pub range: Option<(i64, i64)>,
    pub log_level: Level,
}

impl AppConfig {
    /// Builds the configuration from parsed CLI flags, falling back to
    /// the default log path and home-directory map dir when absent.
    pub fn from_cli(cli: &Cli) -> Self {
        let log_path = cli
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));

        let range = cli.time.as_deref().map(time_codec::parse_search_range);

        let log_level = if cli.debug {
            Level::DEBUG
        } else if cli.verbose {
            Level::INFO
        } else {
            Level::WARN
        };

        Self {
            log_path,
            map_dir: map_dir_root(),
            range,
            log_level,
        }
    }
}

/// The map directory root: `$TGREP_MAP_DIR` if set, else
/// `$HOME/.tgrepmapfiles`.
fn map_dir_root() -> PathBuf {
    if let Ok(dir) = std::env::var(MAP_DIR_ENV) {
        return PathBuf::from(dir);
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(MAP_DIR_NAME)
}

/// Creates the map directory with world-read/write/execute permissions
/// if it doesn't already exist. An existing directory is accepted
/// silently -- this corrects the original's inverted "created"/
/// "existing" log text (see the crate's design notes) without changing
/// observable behavior otherwise.
pub fn ensure_map_dir(dir: &std::path::Path) -> std::io::Result<()> {
    match std::fs::create_dir(dir) {
        Ok(()) => {
            tracing::info!(dir = %dir.display(), "created map directory");
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::debug!(dir = %dir.display(), "map directory already exists");
        }
        Err(e) => return Err(e),
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o777);
        std::fs::set_permissions(dir, perms)?;
    }

    Ok(())
}
