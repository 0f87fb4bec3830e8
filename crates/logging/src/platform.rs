// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

/// Initializes the logging framework to capture logs from the crates specified with a minimum
/// [`log::Level`] of [`Info`](log::Level::Info) on debug builds and [`Warn`](log::Level::Warn) on
/// release builds.  On desktop platforms, these defaults can be overridden by setting the
/// `RUST_LOG` environment variable.
pub struct Logging {
    crates: Vec<&'static str>,
}

impl Logging {
    /// Creates a new [`Logging`] instance with the specified list of crates to capture logs from.
    pub fn new(crates: Vec<&'static str>) -> Self {
        Self { crates }
    }

    /// The level used when `RUST_LOG` is not set.
    pub fn default_level() -> log::LevelFilter {
        if cfg!(debug_assertions) {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        }
    }

    /// Installs the global logger.  Panics if a logger has already been installed; use
    /// [`Logging::try_init`] when that may legitimately have happened (e.g. in tests).
    pub fn init(&self) {
        if let Err(err) = self.try_init() {
            panic!("Failed to initialize logging: {err}");
        }
    }

    pub fn try_init(&self) -> Result<(), log::SetLoggerError> {
        crate::platform_impl::try_init_with_level(&self.crates, Self::default_level())
    }
}

/// Builds the filter string that would otherwise have been set in `RUST_LOG`, e.g.
/// `"velo=info,velo_menu=info"`.
pub fn filter_string(crates: &[&'static str], log_level: log::LevelFilter) -> String {
    let level_str = match log_level {
        log::LevelFilter::Off => "off",
        log::LevelFilter::Error => "error",
        log::LevelFilter::Warn => "warn",
        log::LevelFilter::Info => "info",
        log::LevelFilter::Debug => "debug",
        log::LevelFilter::Trace => "trace",
    };
    crates
        .iter()
        .map(|&pkg_name| format!("{}={}", pkg_name.replace('-', "_"), level_str))
        .collect::<Vec<_>>()
        .join(",")
}


// End of File
