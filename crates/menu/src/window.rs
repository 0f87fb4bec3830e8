// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use std::{ffi::c_void, num::NonZeroIsize, ptr::NonNull};
use thiserror::Error;

/// An opaque handle to the window a menu bar is installed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeWindow {
    /// An `NSView*` or `NSWindow*`.  The macOS menu bar belongs to the application, so this
    /// only tells the installer that the window layer is up.
    AppKit(NonNull<c_void>),
    /// An `HWND`.
    Win32(NonZeroIsize),
    /// A `GtkWindow*`.
    Gtk(NonNull<c_void>),
}

// SAFETY: a NativeWindow is an identifier.  The installers only dereference it on the UI thread
// which owns the window.
unsafe impl Send for NativeWindow {}
unsafe impl Sync for NativeWindow {}

/// The window layer has not created a native window yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Error)]
#[error("the window has not surfaced a native handle yet")]
pub struct HandleUnavailable;

/// Supplies the native window on demand.  Returning [`HandleUnavailable`] is an ordinary
/// outcome (the webview may not have created its window yet), not a failure.
pub trait WindowSource {
    fn native_window(&self) -> Result<NativeWindow, HandleUnavailable>;
}

impl WindowSource for NativeWindow {
    fn native_window(&self) -> Result<NativeWindow, HandleUnavailable> {
        Ok(*self)
    }
}

impl WindowSource for Option<NativeWindow> {
    fn native_window(&self) -> Result<NativeWindow, HandleUnavailable> {
        self.ok_or(HandleUnavailable)
    }
}

/// Adapts any `raw-window-handle` window (winit, tao, ...) into a [`WindowSource`].
pub struct RawWindow<'a, W: ?Sized>(pub &'a W);

impl<W: HasWindowHandle + ?Sized> WindowSource for RawWindow<'_, W> {
    fn native_window(&self) -> Result<NativeWindow, HandleUnavailable> {
        let handle = self.0.window_handle().map_err(|err| {
            log::debug!("window handle not available: {err}");
            HandleUnavailable
        })?;
        match handle.as_raw() {
            RawWindowHandle::AppKit(appkit) => Ok(NativeWindow::AppKit(appkit.ns_view)),
            RawWindowHandle::Win32(win32) => Ok(NativeWindow::Win32(win32.hwnd)),
            other => {
                log::debug!("no menu support for window handle {other:?}");
                Err(HandleUnavailable)
            }
        }
    }
}


// End of File
