/*!
 * Server Configuration
 *
 * Launch-time settings from the command line and environment:
 * - `timeline-server`            sequential mode
 * - `timeline-server <WORKERS>`  parallel mode with that many workers
 * - `TIMELINE_MAX_READERS`       reader bound of the timeline lock
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{DEFAULT_MAX_READERS, ENV_MAX_READERS, MAX_WORKERS};

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Requests applied one at a time on the reading thread
    Sequential,
    /// One reading thread feeding a pool of workers
    Parallel { workers: usize },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub mode: Mode,
    /// Maximum concurrent readers of the timeline
    pub max_readers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

impl ServerConfig {
    pub const fn sequential() -> Self {
        Self {
            mode: Mode::Sequential,
            max_readers: DEFAULT_MAX_READERS,
        }
    }

    pub const fn parallel(workers: usize) -> Self {
        Self {
            mode: Mode::Parallel { workers },
            max_readers: DEFAULT_MAX_READERS,
        }
    }

    pub const fn with_max_readers(mut self, max_readers: usize) -> Self {
        self.max_readers = max_readers;
        self
    }

    /// Build from command-line arguments (program name already stripped)
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        match args.as_slice() {
            [] => Ok(Self::sequential()),
            [workers] => parse_workers(AsRef::<str>::as_ref(workers)).map(Self::parallel),
            [_, rest @ ..] => Err(ConfigError::UnexpectedArguments(
                rest.iter()
                    .map(AsRef::<str>::as_ref)
                    .collect::<Vec<_>>()
                    .join(" "),
            )),
        }
    }

    /// Apply `TIMELINE_MAX_READERS` when set
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_max_readers_override(std::env::var(ENV_MAX_READERS).ok().as_deref())
    }

    /// Apply a raw reader bound override, as read from the environment
    pub fn with_max_readers_override(self, raw: Option<&str>) -> Result<Self, ConfigError> {
        let Some(raw) = raw else {
            return Ok(self);
        };
        match raw.trim().parse::<usize>() {
            Ok(max_readers) if max_readers > 0 => Ok(self.with_max_readers(max_readers)),
            _ => Err(ConfigError::InvalidMaxReaders(raw.to_string())),
        }
    }

    /// Number of threads consuming requests (1 in sequential mode)
    pub fn consumers(&self) -> usize {
        match self.mode {
            Mode::Sequential => 1,
            Mode::Parallel { workers } => workers,
        }
    }
}

fn parse_workers(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(workers) if (1..=MAX_WORKERS).contains(&workers) => Ok(workers),
        _ => Err(ConfigError::InvalidWorkers(raw.to_string())),
    }
}
