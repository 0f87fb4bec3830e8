// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Win32 menu bars.  `WM_COMMAND` reaches us through a window subclass whose reference data is a
//! small integer handle into [`ROUTES`], never a pointer.

use crate::{
    Action, CallbackRegistry, InstallError, Menu, MenuRole, NativeWindow, Platform,
    PlatformInstaller,
    native::win32::{self, AccelEntry, MenuFlags, Win32Toolkit},
};
use std::{
    collections::HashMap,
    ffi::c_void,
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak},
};
use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, LRESULT, WPARAM},
        UI::{
            Input::KeyboardAndMouse::GetFocus,
            Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass},
            WindowsAndMessaging::{
                ACCEL, ACCEL_VIRT_FLAGS, AppendMenuW, CreateAcceleratorTableW, CreateMenu,
                CreatePopupMenu, DestroyAcceleratorTable, DestroyMenu, DrawMenuBar, GetMenu, HACCEL,
                HMENU, MENU_ITEM_FLAGS, MSG, PostMessageW, SW_MINIMIZE, SetMenu, ShowWindow,
                TranslateAcceleratorW, WM_CLEAR, WM_CLOSE, WM_COMMAND, WM_COPY, WM_CUT,
                WM_NCDESTROY, WM_PASTE, WM_UNDO,
            },
        },
    },
    core::PCWSTR,
};

const SUBCLASS_ID: usize = 0x7665_6C6F;
const EM_SETSEL: u32 = 0x00B1;

struct Route {
    hwnd: isize,
    registry: Weak<CallbackRegistry>,
    accelerators: Option<isize>,
}

#[derive(Default)]
struct Routes {
    last_handle: usize,
    windows: HashMap<usize, Route>,
}

static ROUTES: LazyLock<Mutex<Routes>> = LazyLock::new(Default::default);

fn routes() -> MutexGuard<'static, Routes> {
    ROUTES.lock().unwrap_or_else(PoisonError::into_inner)
}

fn hwnd_of(hwnd: isize) -> HWND {
    HWND(hwnd as *mut c_void)
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn destroy_accelerators(raw: isize) {
    unsafe {
        let _ = DestroyAcceleratorTable(HACCEL(raw as *mut c_void));
    }
}

fn post(hwnd: isize, msg: u32, wparam: usize, lparam: isize) {
    unsafe {
        let _ = PostMessageW(Some(hwnd_of(hwnd)), msg, WPARAM(wparam), LPARAM(lparam));
    }
}

/// Posts `msg` to whichever control has keyboard focus, for the edit roles.
fn focused(msg: u32, wparam: usize, lparam: isize) -> Action {
    Action::new(move || {
        let focus = unsafe { GetFocus() };
        if !focus.is_invalid() {
            post(focus.0 as isize, msg, wparam, lparam);
        }
    })
}

unsafe extern "system" fn subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _subclass_id: usize,
    handle: usize,
) -> LRESULT {
    if msg == WM_COMMAND {
        let registry = routes()
            .windows
            .get(&handle)
            .and_then(|route| route.registry.upgrade());
        if let Some(registry) = registry {
            if win32::handle_message(&registry, msg, wparam.0, lparam.0) {
                return LRESULT(0);
            }
        }
    } else if msg == WM_NCDESTROY {
        if let Some(route) = routes().windows.remove(&handle) {
            if let Some(raw) = route.accelerators {
                destroy_accelerators(raw);
            }
        }
        unsafe {
            let _ = RemoveWindowSubclass(hwnd, Some(subclass_proc), SUBCLASS_ID);
        }
    }
    unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) }
}

/// Points the window's subclass at `registry`, subclassing it on first use.
fn route(
    hwnd: isize,
    registry: &Arc<CallbackRegistry>,
    accelerators: Option<isize>,
) -> Result<(), InstallError> {
    let handle = {
        let mut routes = routes();
        let existing = routes.windows.values_mut().find(|route| route.hwnd == hwnd);
        if let Some(route) = existing {
            route.registry = Arc::downgrade(registry);
            if let Some(old) = std::mem::replace(&mut route.accelerators, accelerators) {
                destroy_accelerators(old);
            }
            return Ok(());
        }
        routes.last_handle += 1;
        let handle = routes.last_handle;
        routes.windows.insert(
            handle,
            Route {
                hwnd,
                registry: Arc::downgrade(registry),
                accelerators,
            },
        );
        handle
    };

    let subclassed =
        unsafe { SetWindowSubclass(hwnd_of(hwnd), Some(subclass_proc), SUBCLASS_ID, handle) };
    if !subclassed.as_bool() {
        if let Some(raw) = routes().windows.remove(&handle).and_then(|route| route.accelerators) {
            destroy_accelerators(raw);
        }
        return Err(InstallError::allocation("window subclass", "SetWindowSubclass failed"));
    }
    Ok(())
}

/// Hosts running their own message loop call this before `TranslateMessage`, so menu
/// accelerators work while a child control (such as a webview) has focus.  Returns true if the
/// message was consumed.
pub fn translate_accelerator(hwnd: isize, msg: &MSG) -> bool {
    let accelerators = routes()
        .windows
        .values()
        .find(|route| route.hwnd == hwnd)
        .and_then(|route| route.accelerators);
    match accelerators {
        Some(raw) => unsafe {
            TranslateAcceleratorW(hwnd_of(hwnd), HACCEL(raw as *mut c_void), msg) != 0
        },
        None => false,
    }
}

struct User32;

impl Win32Toolkit for User32 {
    type Menu = HMENU;

    fn create_menu_bar(&mut self) -> Result<HMENU, InstallError> {
        unsafe { CreateMenu() }.map_err(|err| InstallError::allocation("menu bar", err))
    }

    fn create_popup_menu(&mut self) -> Result<HMENU, InstallError> {
        unsafe { CreatePopupMenu() }.map_err(|err| InstallError::allocation("popup menu", err))
    }

    fn append_command(
        &mut self,
        parent: HMENU,
        flags: MenuFlags,
        command: u16,
        text: &str,
    ) -> Result<(), InstallError> {
        let text = wide(text);
        unsafe {
            AppendMenuW(
                parent,
                MENU_ITEM_FLAGS(flags.bits()),
                usize::from(command),
                PCWSTR::from_raw(text.as_ptr()),
            )
        }
        .map_err(|err| InstallError::allocation("menu item", err))
    }

    fn append_popup(
        &mut self,
        parent: HMENU,
        popup: HMENU,
        flags: MenuFlags,
        text: &str,
    ) -> Result<(), InstallError> {
        let text = wide(text);
        unsafe {
            AppendMenuW(
                parent,
                MENU_ITEM_FLAGS((flags | MenuFlags::POPUP).bits()),
                popup.0 as usize,
                PCWSTR::from_raw(text.as_ptr()),
            )
        }
        .map_err(|err| InstallError::allocation("submenu item", err))
    }

    fn append_separator(&mut self, parent: HMENU) -> Result<(), InstallError> {
        unsafe {
            AppendMenuW(
                parent,
                MENU_ITEM_FLAGS(MenuFlags::SEPARATOR.bits()),
                0,
                PCWSTR::null(),
            )
        }
        .map_err(|err| InstallError::allocation("separator", err))
    }

    fn destroy_menu(&mut self, menu: HMENU) {
        unsafe {
            let _ = DestroyMenu(menu);
        }
    }

    fn role_action(&mut self, hwnd: isize, role: MenuRole) -> Option<Action> {
        match role {
            MenuRole::Quit | MenuRole::Close => {
                Some(Action::new(move || post(hwnd, WM_CLOSE, 0, 0)))
            }
            MenuRole::Minimize => Some(Action::new(move || unsafe {
                let _ = ShowWindow(hwnd_of(hwnd), SW_MINIMIZE);
            })),
            MenuRole::Undo => Some(focused(WM_UNDO, 0, 0)),
            MenuRole::Cut => Some(focused(WM_CUT, 0, 0)),
            MenuRole::Copy => Some(focused(WM_COPY, 0, 0)),
            MenuRole::Paste => Some(focused(WM_PASTE, 0, 0)),
            MenuRole::Delete => Some(focused(WM_CLEAR, 0, 0)),
            MenuRole::SelectAll => Some(focused(EM_SETSEL, 0, -1)),
            _ => None,
        }
    }

    fn attach(
        &mut self,
        hwnd: isize,
        menu_bar: HMENU,
        accelerators: &[AccelEntry],
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError> {
        let window = hwnd_of(hwnd);
        let table: Vec<ACCEL> = accelerators
            .iter()
            .map(|entry| ACCEL {
                fVirt: ACCEL_VIRT_FLAGS(entry.flags.bits()),
                key: entry.key,
                cmd: entry.command,
            })
            .collect();
        let accelerators = if table.is_empty() {
            None
        } else {
            let table = unsafe { CreateAcceleratorTableW(&table) }
                .map_err(|err| InstallError::allocation("accelerator table", err))?;
            Some(table.0 as isize)
        };

        let previous = unsafe { GetMenu(window) };
        if let Err(err) = unsafe { SetMenu(window, Some(menu_bar)) } {
            if let Some(raw) = accelerators {
                destroy_accelerators(raw);
            }
            return Err(InstallError::allocation("window menu", err));
        }
        unsafe {
            let _ = DrawMenuBar(window);
        }
        if !previous.is_invalid() && previous != menu_bar {
            self.destroy_menu(previous);
        }
        route(hwnd, registry, accelerators)
    }
}

pub(crate) struct User32Installer;

impl PlatformInstaller for User32Installer {
    fn platform(&self) -> Platform {
        Platform::Win32
    }

    fn install(
        &mut self,
        menu: &Menu,
        window: &NativeWindow,
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError> {
        win32::install(&mut User32, menu, window, registry)
    }
}

pub(crate) fn native_installer() -> Box<dyn PlatformInstaller> {
    Box::new(User32Installer)
}

// End of File
