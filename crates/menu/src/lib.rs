// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! # velo's Menus
//!
//! An application describes its menu bar once, as a [`Menu`] of [`MenuItem`]s, and hands it to
//! a [`MenuController`].  The controller installs it as a genuinely native menu where it can
//! (Cocoa on macOS, Win32 on Windows, GTK 3 on Linux and the BSDs with the `gtk` feature), and
//! otherwise draws it into the hosted page as a scripted menu bar.  Either way, a click on an
//! item runs the same [`Action`], looked up through one [`CallbackRegistry`].

mod config;
pub use config::{BackendPreference, FallbackConfig, MenuConfig};

mod controller;
pub use controller::{Backend, InstallState, MenuController};

mod error;
pub use error::{BridgeError, ControllerError, FallbackError, InstallError, MenuError};

pub mod fallback;
pub use fallback::{ContentBridge, FallbackItem, FallbackRenderer};

mod installer;
pub use installer::{Platform, PlatformInstaller, UnsupportedInstaller, native_installer};

mod model;
pub use model::{Action, Menu, MenuItem, MenuItemKind, MenuRole, Placement};

pub mod native;

mod platform_impl;
#[cfg(target_os = "windows")]
pub use platform_impl::translate_accelerator;

mod registry;
pub use registry::CallbackRegistry;

pub mod template;
pub use template::{FileActions, default_app_menu, edit_menu, file_menu};

mod window;
pub use window::{HandleUnavailable, NativeWindow, RawWindow, WindowSource};

/// Re-export the public API of the menu crate.
pub mod prelude {
    pub use crate::{
        Action, Backend, ContentBridge, InstallState, Menu, MenuConfig, MenuController, MenuItem,
        MenuItemKind, MenuRole, NativeWindow, Platform, RawWindow, WindowSource,
        default_app_menu,
    };
}

// End of File
