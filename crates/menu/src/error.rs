// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use thiserror::Error;

/// Errors from editing a [`Menu`](crate::Menu) tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("a menu item with id {0:?} already exists in this menu")]
    DuplicateId(String),
    #[error("no menu item with id {0:?}")]
    ParentNotFound(String),
    #[error("menu item {0:?} is a separator and cannot hold a submenu")]
    NotASubmenu(String),
}

/// Reasons a native installer could not put the menu on screen.  None of these are fatal to the
/// application: the [`MenuController`](crate::MenuController) absorbs them and falls back to the
/// scripted menu.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InstallError {
    /// The window layer has not produced a native handle of the expected kind yet.  Retryable.
    #[error("the window has no native handle yet")]
    NoWindowHandle,
    /// There is no native installer for the running OS.
    #[error("native menus are not supported on {platform}")]
    PlatformUnsupported { platform: &'static str },
    /// The toolkit refused to create a menu object.
    #[error("the native toolkit failed to create {object}: {reason}")]
    NativeAllocationFailed {
        object: &'static str,
        reason: String,
    },
    /// Native menus were turned off by configuration.
    #[error("native menus are disabled by configuration")]
    Disabled,
}

impl InstallError {
    pub fn allocation(object: &'static str, reason: impl ToString) -> Self {
        InstallError::NativeAllocationFailed {
            object,
            reason: reason.to_string(),
        }
    }

    /// Whether calling `install` again later may succeed without any change to the menu.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InstallError::NoWindowHandle)
    }
}

/// A failure reported by the hosted-content bridge (usually a webview binding layer).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("content bridge: {0}")]
pub struct BridgeError(pub String);

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("no hosted-content bridge is available")]
    NoBridge,
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("failed to serialize the menu description: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("could not install a menu: {native}; fallback: {fallback}")]
    Install {
        native: InstallError,
        fallback: FallbackError,
    },
}

// End of File
