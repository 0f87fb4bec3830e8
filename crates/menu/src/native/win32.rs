// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Win32 menu bars: an `HMENU` tree whose leaves carry 16-bit command ids, plus an accelerator
//! table.  Clicks and accelerator presses both arrive at the window procedure as `WM_COMMAND`.

use crate::{
    Action, CallbackRegistry, InstallError, Menu, MenuItem, MenuItemKind, MenuRole, NativeWindow,
};
use keyboard::{Accelerator, Key, ModifierKeys, NamedKey};
use std::sync::Arc;

/// Command ids at or below this value belong to the system.  Ours start one above it.
pub const COMMAND_ID_BASE: u32 = 1000;
/// `WM_COMMAND` carries the id in the low word of `wParam`.
pub const LAST_COMMAND_ID: u32 = 0xFFFF;
pub const WM_COMMAND: u32 = 0x0111;

bitflags::bitflags! {
    /// The `MF_*` flags of `AppendMenuW`.  `MF_STRING` is zero and implied.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MenuFlags: u32 {
        const GRAYED     = 0x0001;
        const DISABLED   = 0x0002;
        const CHECKED    = 0x0008;
        const POPUP      = 0x0010;
        const RADIOCHECK = 0x0200;
        const SEPARATOR  = 0x0800;
    }
}

bitflags::bitflags! {
    /// The `fVirt` field of an `ACCEL` entry.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AccelFlags: u8 {
        const VIRTKEY = 0x01;
        const SHIFT   = 0x04;
        const CONTROL = 0x08;
        const ALT     = 0x10;
    }
}

/// One row of the accelerator table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccelEntry {
    pub flags: AccelFlags,
    pub key: u16,
    pub command: u16,
}

/// The `user32` calls the installer needs.  The real implementation lives in
/// `platform_impl::windows`; tests substitute a recording one.
pub trait Win32Toolkit {
    type Menu: Copy;

    fn create_menu_bar(&mut self) -> Result<Self::Menu, InstallError>;
    fn create_popup_menu(&mut self) -> Result<Self::Menu, InstallError>;
    fn append_command(
        &mut self,
        parent: Self::Menu,
        flags: MenuFlags,
        command: u16,
        text: &str,
    ) -> Result<(), InstallError>;
    fn append_popup(
        &mut self,
        parent: Self::Menu,
        popup: Self::Menu,
        flags: MenuFlags,
        text: &str,
    ) -> Result<(), InstallError>;
    fn append_separator(&mut self, parent: Self::Menu) -> Result<(), InstallError>;
    fn destroy_menu(&mut self, menu: Self::Menu);

    /// What a role-only item does on this window (post `WM_CLOSE` for Quit, send `WM_COPY` to
    /// the focused control for Copy, ...).
    fn role_action(&mut self, hwnd: isize, role: MenuRole) -> Option<Action>;

    /// Swaps `menu_bar` in as the window's menu, destroying any previous one, and routes
    /// `WM_COMMAND` and `accelerators` to `registry`.
    fn attach(
        &mut self,
        hwnd: isize,
        menu_bar: Self::Menu,
        accelerators: &[AccelEntry],
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError>;
}

/// The virtual-key code of `key`, if it has a layout-independent one.
pub fn key_code(key: Key) -> Option<u16> {
    Some(match key {
        Key::Char(c @ ('A'..='Z' | '0'..='9')) => c as u16,
        Key::Char(c) => match c {
            ';' => 0xBA,
            '=' | '+' => 0xBB,
            ',' => 0xBC,
            '-' => 0xBD,
            '.' => 0xBE,
            '/' => 0xBF,
            '`' => 0xC0,
            '[' => 0xDB,
            '\\' => 0xDC,
            ']' => 0xDD,
            '\'' => 0xDE,
            _ => return None,
        },
        Key::Function(n) => 0x70 + u16::from(n) - 1,
        Key::Named(named) => match named {
            NamedKey::Backspace => 0x08,
            NamedKey::Tab => 0x09,
            NamedKey::Enter => 0x0D,
            NamedKey::Escape => 0x1B,
            NamedKey::Space => 0x20,
            NamedKey::PageUp => 0x21,
            NamedKey::PageDown => 0x22,
            NamedKey::End => 0x23,
            NamedKey::Home => 0x24,
            NamedKey::Left => 0x25,
            NamedKey::Up => 0x26,
            NamedKey::Right => 0x27,
            NamedKey::Down => 0x28,
            NamedKey::Insert => 0x2D,
            NamedKey::Delete => 0x2E,
        },
    })
}

/// Translates a chord into a virtual key and `FVIRTKEY`-style flags.  Windows has no Command
/// key, so Command is read as Control.
pub fn virtual_key(accelerator: &Accelerator) -> Option<(u16, AccelFlags)> {
    let key = key_code(accelerator.key)?;
    let modifiers = accelerator.modifiers;
    let mut flags = AccelFlags::VIRTKEY;
    if modifiers.intersects(ModifierKeys::CONTROL | ModifierKeys::COMMAND) {
        flags |= AccelFlags::CONTROL;
    }
    if modifiers.contains(ModifierKeys::OPTION) {
        flags |= AccelFlags::ALT;
    }
    if modifiers.contains(ModifierKeys::SHIFT) {
        flags |= AccelFlags::SHIFT;
    }
    Some((key, flags))
}

/// The accelerator as Windows menus show it, right-aligned after a tab.
pub fn accelerator_text(accelerator: &Accelerator) -> String {
    let modifiers = accelerator.modifiers;
    let mut text = String::new();
    if modifiers.intersects(ModifierKeys::CONTROL | ModifierKeys::COMMAND) {
        text.push_str("Ctrl+");
    }
    if modifiers.contains(ModifierKeys::OPTION) {
        text.push_str("Alt+");
    }
    if modifiers.contains(ModifierKeys::SHIFT) {
        text.push_str("Shift+");
    }
    text.push_str(&accelerator.key.to_string());
    text
}

pub fn menu_text(label: &str, accelerator: Option<&Accelerator>) -> String {
    match accelerator {
        Some(accelerator) => format!("{label}\t{}", accelerator_text(accelerator)),
        None => label.to_owned(),
    }
}

/// Extracts our command id from a `WM_COMMAND`.  Notifications from child controls (non-zero
/// `lParam`) and ids in the system range are not ours.
pub fn command_tag(wparam: usize, lparam: isize) -> Option<u32> {
    let source = (wparam >> 16) & 0xFFFF;
    let id = (wparam & 0xFFFF) as u32;
    // Source 0 is a menu, 1 an accelerator.
    if lparam != 0 || source > 1 || id <= COMMAND_ID_BASE {
        return None;
    }
    Some(id)
}

/// Dispatches a window message to the registry if it is one of our commands.  Returns true if
/// an action ran.
pub fn handle_message(registry: &CallbackRegistry, msg: u32, wparam: usize, lparam: isize) -> bool {
    msg == WM_COMMAND
        && command_tag(wparam, lparam).is_some_and(|id| registry.dispatch(id))
}

struct Builder<'a, T: Win32Toolkit> {
    toolkit: &'a mut T,
    hwnd: isize,
    registry: &'a Arc<CallbackRegistry>,
    accelerators: Vec<AccelEntry>,
}

impl<T: Win32Toolkit> Builder<'_, T> {
    fn append_items(&mut self, parent: T::Menu, menu: &Menu) -> Result<(), InstallError> {
        for item in menu.items() {
            if item.is_separator() {
                self.toolkit.append_separator(parent)?;
            } else if item.is_submenu() {
                self.append_popup(parent, &item)?;
            } else {
                self.append_leaf(parent, &item)?;
            }
        }
        Ok(())
    }

    fn append_popup(&mut self, parent: T::Menu, item: &MenuItem) -> Result<(), InstallError> {
        let popup = self.toolkit.create_popup_menu()?;
        let flags = if item.enabled {
            MenuFlags::POPUP
        } else {
            MenuFlags::POPUP | MenuFlags::GRAYED
        };
        let filled = match &item.submenu {
            Some(submenu) => self.append_items(popup, submenu),
            None => Ok(()),
        };
        let attached =
            filled.and_then(|()| self.toolkit.append_popup(parent, popup, flags, &item.label));
        if attached.is_err() {
            self.toolkit.destroy_menu(popup);
        }
        attached
    }

    fn append_leaf(&mut self, parent: T::Menu, item: &MenuItem) -> Result<(), InstallError> {
        let action = item.action.clone().or_else(|| {
            item.role
                .and_then(|role| self.toolkit.role_action(self.hwnd, role))
        });
        let tag = self.registry.register(action);
        let command = u16::try_from(tag).map_err(|_| {
            InstallError::allocation("menu command id", format!("{tag} does not fit in 16 bits"))
        })?;

        let mut flags = MenuFlags::empty();
        if !item.enabled {
            flags |= MenuFlags::GRAYED;
        }
        match item.kind {
            MenuItemKind::Checkbox if item.checked => flags |= MenuFlags::CHECKED,
            MenuItemKind::Radio if item.checked => {
                flags |= MenuFlags::CHECKED | MenuFlags::RADIOCHECK
            }
            MenuItemKind::Radio => flags |= MenuFlags::RADIOCHECK,
            _ => {}
        }

        let accelerator = item.parsed_accelerator();
        let text = menu_text(&item.label, accelerator.as_ref());
        self.toolkit.append_command(parent, flags, command, &text)?;

        if command != 0 {
            if let Some((key, flags)) = accelerator.as_ref().and_then(virtual_key) {
                self.accelerators.push(AccelEntry { flags, key, command });
            }
        }
        Ok(())
    }
}

/// Builds the `HMENU` tree for `menu` depth-first and attaches it to the window.  On any failure
/// the partially built tree is destroyed and the window keeps its previous menu.
pub fn install<T: Win32Toolkit>(
    toolkit: &mut T,
    menu: &Menu,
    window: &NativeWindow,
    registry: &Arc<CallbackRegistry>,
) -> Result<(), InstallError> {
    let NativeWindow::Win32(hwnd) = *window else {
        return Err(InstallError::NoWindowHandle);
    };
    let hwnd = hwnd.get();

    let menu_bar = toolkit.create_menu_bar()?;
    let mut builder = Builder {
        toolkit: &mut *toolkit,
        hwnd,
        registry,
        accelerators: Vec::new(),
    };
    let built = builder.append_items(menu_bar, menu);
    let accelerators = builder.accelerators;
    let attached = built.and_then(|()| toolkit.attach(hwnd, menu_bar, &accelerators, registry));
    match attached {
        Ok(()) => {
            log::debug!(
                "installed Win32 menu bar with {} accelerators",
                accelerators.len()
            );
            Ok(())
        }
        Err(err) => {
            toolkit.destroy_menu(menu_bar);
            Err(err)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{testing::*, *};
    use std::num::NonZeroIsize;

    fn window() -> NativeWindow {
        NativeWindow::Win32(NonZeroIsize::new(0x42).unwrap())
    }

    fn accel(chord: &str) -> Accelerator {
        Accelerator::parse(chord).unwrap()
    }

    #[test]
    fn translates_common_chords() {
        assert_eq!(
            virtual_key(&accel("Ctrl+N")),
            Some((b'N' as u16, AccelFlags::VIRTKEY | AccelFlags::CONTROL))
        );
        assert_eq!(
            virtual_key(&accel("Alt+F4")),
            Some((0x73, AccelFlags::VIRTKEY | AccelFlags::ALT))
        );
        assert_eq!(
            virtual_key(&accel("Command+Shift+Z")),
            Some((b'Z' as u16, AccelFlags::VIRTKEY | AccelFlags::CONTROL | AccelFlags::SHIFT))
        );
        assert_eq!(virtual_key(&accel("Ctrl+=")).map(|(k, _)| k), Some(0xBB));
        assert_eq!(virtual_key(&accel("Ctrl+Delete")).map(|(k, _)| k), Some(0x2E));
        assert_eq!(virtual_key(&accel("Ctrl+@")), None);
    }

    #[test]
    fn labels_show_the_accelerator_after_a_tab() {
        assert_eq!(menu_text("New", Some(&accel("Ctrl+N"))), "New\tCtrl+N");
        assert_eq!(menu_text("Redo", Some(&accel("Command+Shift+z"))), "Redo\tCtrl+Shift+Z");
        assert_eq!(menu_text("About", None), "About");
    }

    #[test]
    fn command_tag_filters_foreign_commands() {
        assert_eq!(command_tag(1001, 0), Some(1001));
        assert_eq!(command_tag((1 << 16) | 1002, 0), Some(1002));
        assert_eq!(command_tag(1001, 0x5000), None);
        assert_eq!(command_tag(2, 0), None);
        assert_eq!(command_tag(1000, 0), None);
        assert_eq!(command_tag((5 << 16) | 1001, 0), None);
    }

    #[test]
    fn builds_nested_popups_depth_first() {
        let menu = Menu::new()
            .and_then(MenuItem::submenu(
                "file",
                "File",
                Menu::new()
                    .and_then(
                        MenuItem::new("new", "New")
                            .with_accelerator("Ctrl+N")
                            .on_click(|| {}),
                    )
                    .and_then(MenuItem::separator())
                    .and_then(MenuItem::checkbox("autosave", "Autosave", true).on_click(|| {})),
            ))
            .and_then(MenuItem::submenu(
                "view",
                "View",
                Menu::new().and_then(MenuItem::radio("dark", "Dark", false).disabled()),
            ));
        let registry = Arc::new(CallbackRegistry::with_base(COMMAND_ID_BASE));
        let mut recorder = Recorder::default();
        install(&mut recorder, &menu, &window(), &registry).unwrap();

        assert_eq!(
            recorder.calls,
            vec![
                Call::Command {
                    parent: 2,
                    flags: MenuFlags::empty(),
                    command: 1001,
                    text: "New\tCtrl+N".into(),
                },
                Call::Separator { parent: 2 },
                Call::Command {
                    parent: 2,
                    flags: MenuFlags::CHECKED,
                    command: 1002,
                    text: "Autosave".into(),
                },
                Call::Popup {
                    parent: 1,
                    popup: 2,
                    flags: MenuFlags::POPUP,
                    text: "File".into(),
                },
                Call::Command {
                    parent: 3,
                    flags: MenuFlags::GRAYED | MenuFlags::RADIOCHECK,
                    command: 0,
                    text: "Dark".into(),
                },
                Call::Popup {
                    parent: 1,
                    popup: 3,
                    flags: MenuFlags::POPUP,
                    text: "View".into(),
                },
                Call::Attach {
                    hwnd: 0x42,
                    menu_bar: 1,
                    accelerators: vec![AccelEntry {
                        flags: AccelFlags::VIRTKEY | AccelFlags::CONTROL,
                        key: b'N' as u16,
                        command: 1001,
                    }]
                },
            ]
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn role_items_get_toolkit_actions() {
        let menu = Menu::new()
            .and_then(MenuItem::new("quit", "Exit").with_role(MenuRole::Quit))
            .and_then(MenuItem::new("reload", "Reload").with_role(MenuRole::Reload));
        let registry = Arc::new(CallbackRegistry::with_base(COMMAND_ID_BASE));
        let mut recorder = Recorder::default();
        install(&mut recorder, &menu, &window(), &registry).unwrap();
        assert_eq!(
            recorder.commands(),
            vec![(1001, "Exit".to_owned()), (0, "Reload".to_owned())]
        );
    }

    #[test]
    fn failure_destroys_the_partial_tree() {
        let menu = Menu::new()
            .and_then(MenuItem::submenu("a", "A", Menu::new().and_then(MenuItem::new("a1", "A1"))))
            .and_then(MenuItem::submenu("b", "B", Menu::new().and_then(MenuItem::new("b1", "B1"))));
        let registry = Arc::new(CallbackRegistry::with_base(COMMAND_ID_BASE));
        let mut recorder = Recorder { fail_popups_after: Some(2), ..Recorder::default() };
        let err = install(&mut recorder, &menu, &window(), &registry).unwrap_err();
        assert!(matches!(err, InstallError::NativeAllocationFailed { .. }));
        assert_eq!(recorder.calls.last(), Some(&Call::Destroy(1)));
        assert!(!recorder.calls.iter().any(|call| matches!(call, Call::Attach { .. })));
    }

    #[test]
    fn wrong_window_kind_is_no_window_handle() {
        let appkit = NativeWindow::AppKit(std::ptr::NonNull::dangling());
        let registry = Arc::new(CallbackRegistry::new());
        let mut recorder = Recorder::default();
        assert_eq!(
            install(&mut recorder, &Menu::new(), &appkit, &registry),
            Err(InstallError::NoWindowHandle)
        );
        assert_eq!(recorder.menus_created, 0);
    }

    #[test]
    fn ids_beyond_sixteen_bits_fail() {
        let menu = Menu::new().and_then(MenuItem::new("x", "X").on_click(|| {}));
        let registry = Arc::new(CallbackRegistry::with_base(LAST_COMMAND_ID));
        let mut recorder = Recorder::default();
        let err = install(&mut recorder, &menu, &window(), &registry).unwrap_err();
        assert!(matches!(
            err,
            InstallError::NativeAllocationFailed {
                object: "menu command id",
                ..
            }
        ));
    }
}

// End of File
