// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! # velo
//!
//! Native application menus for webview hosts.  See [`menu`] for the model and the
//! [`MenuController`](menu::MenuController) which installs it.

pub use keyboard;
pub use logging;
pub use menu;

use logging::prelude::*;
use menu::{MenuConfig, Platform, fallback::describe};

pub const APP_NAME: &str = "velo";

/// Most commonly used types, suitable for glob import.
pub mod prelude {
    pub use keyboard::prelude::*;
    pub use logging::prelude::*;
    pub use menu::prelude::*;
}

/// The crates whose log output applications usually want to see.
pub fn log_targets() -> Vec<&'static str> {
    vec![
        env!("CARGO_PKG_NAME"),
        "velo_keyboard",
        "velo_logging",
        "velo_menu",
    ]
}

/// Prints the default menu for this platform as the scripted menu would receive it.  Reads
/// `VELO_MENU_APP_NAME` and `VELO_MENU_BACKEND` from the environment, or a configuration file
/// when `config_path` is given.
pub fn start(config_path: Option<&str>) -> anyhow::Result<()> {
    Logging::new(log_targets()).init();

    let config = match config_path {
        Some(path) => MenuConfig::from_file(path)?.with_overrides(|name| std::env::var(name).ok()),
        None => MenuConfig::from_env(),
    };
    let platform = Platform::current();
    log::info!("{} menu for {platform} ({:?} backend)", config.app_name, config.backend);

    let menu = menu::default_app_menu(&config.app_name, platform);
    println!("{}", serde_json::to_string_pretty(&describe(&menu))?);
    Ok(())
}


// End of File
