// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use crate::{CallbackRegistry, InstallError, Menu, NativeWindow, native::win32};
use serde::Serialize;
use std::{fmt, sync::Arc};

/// The native menu system of the running OS, decided at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    Cocoa,
    Gtk,
    Win32,
    Unsupported,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Cocoa
        } else if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(any(
            target_os = "linux",
            target_os = "dragonfly",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        )) {
            Platform::Gtk
        } else {
            Platform::Unsupported
        }
    }

    /// Registry ids on this platform start just above this value.
    pub fn id_base(self) -> u32 {
        match self {
            Platform::Win32 => win32::COMMAND_ID_BASE,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Cocoa => "Cocoa",
            Platform::Gtk => "GTK",
            Platform::Win32 => "Win32",
            Platform::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns a [`Menu`] into the platform's own menu objects and attaches them to a window.
///
/// Implementations register every clickable item's action in `registry` and arrange for
/// activations to come back through [`CallbackRegistry::dispatch`].  They must be called on the
/// thread which owns the native UI.
pub trait PlatformInstaller: Send {
    fn platform(&self) -> Platform;

    fn install(
        &mut self,
        menu: &Menu,
        window: &NativeWindow,
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError>;
}

/// The installer for systems without native menu support.  Always fails, which sends the
/// controller straight to the fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedInstaller;

impl PlatformInstaller for UnsupportedInstaller {
    fn platform(&self) -> Platform {
        Platform::Unsupported
    }

    fn install(
        &mut self,
        _menu: &Menu,
        _window: &NativeWindow,
        _registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError> {
        Err(InstallError::PlatformUnsupported {
            platform: std::env::consts::OS,
        })
    }
}

/// The installer for the running OS, or [`UnsupportedInstaller`] when there is none.
pub fn native_installer() -> Box<dyn PlatformInstaller> {
    crate::platform_impl::native_installer()
}


// End of File
