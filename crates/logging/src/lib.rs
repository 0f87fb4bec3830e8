// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! # velo's Logging Framework
//!
//! This crate initializes the logging framework for velo applications.  It uses the [`log`]
//! crate as the logging facade and [`env_logger`] to read logging configuration from the
//! environment on desktop platforms.  Applications build a [`Logging`] value naming the crates
//! whose output they want to see, and call [`Logging::init`] once at startup.
//!
//! By default, the logging level is set to [`Info`](log::Level::Info) for debug builds, and
//! [`Warn`](log::Level::Warn) for release builds. This can be overridden by setting the `RUST_LOG`
//! environment variable, like so:
//!
//! ```sh
//! $> RUST_LOG=velo_menu=debug cargo run
//! ```

mod platform;
mod platform_impl;
pub use platform::{Logging, filter_string};

/// A module which is typically glob imported.
pub mod prelude {
    pub use super::Logging;
}

// End of File
