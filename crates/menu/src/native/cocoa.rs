// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! The macOS menu bar belongs to `NSApplication`, not to a window.  Items with an action carry
//! their registry id as the `NSMenuItem` tag; items with only a role send the standard AppKit
//! selector up the responder chain.

use crate::{CallbackRegistry, InstallError, Menu, MenuItem, MenuRole, NativeWindow};
use keyboard::{Accelerator, Key, ModifierKeys, NamedKey};
use std::{ffi::CStr, sync::Arc};

/// The `keyEquivalent` string and modifier mask of an `NSMenuItem`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEquivalent {
    pub key: String,
    pub modifiers: ModifierKeys,
}

/// Translates a chord for AppKit.  A chord that names Control but not Command is read as
/// Command, so the same `"Ctrl+C"` works on every platform.
pub fn key_equivalent(accelerator: &Accelerator) -> Option<KeyEquivalent> {
    let key = match accelerator.key {
        Key::Char(c) if c.is_ascii_alphabetic() => c.to_ascii_lowercase().to_string(),
        Key::Char(c) => c.to_string(),
        Key::Function(n) => char::from_u32(0xF704 + u32::from(n) - 1)?.to_string(),
        Key::Named(named) => match named {
            NamedKey::Backspace => "\u{8}",
            NamedKey::Delete => "\u{F728}",
            NamedKey::Enter => "\r",
            NamedKey::Tab => "\t",
            NamedKey::Escape => "\u{1b}",
            NamedKey::Space => " ",
            NamedKey::Up => "\u{F700}",
            NamedKey::Down => "\u{F701}",
            NamedKey::Left => "\u{F702}",
            NamedKey::Right => "\u{F703}",
            NamedKey::Insert => "\u{F727}",
            NamedKey::Home => "\u{F729}",
            NamedKey::End => "\u{F72B}",
            NamedKey::PageUp => "\u{F72C}",
            NamedKey::PageDown => "\u{F72D}",
        }
        .to_owned(),
    };

    let mut modifiers = accelerator.modifiers
        & (ModifierKeys::CONTROL
            | ModifierKeys::OPTION
            | ModifierKeys::SHIFT
            | ModifierKeys::COMMAND);
    if !modifiers.contains(ModifierKeys::COMMAND) && modifiers.contains(ModifierKeys::CONTROL) {
        modifiers.remove(ModifierKeys::CONTROL);
        modifiers.insert(ModifierKeys::COMMAND);
    }
    Some(KeyEquivalent { key, modifiers })
}

/// The AppKit selector implementing `role`, if AppKit has one.
pub fn standard_selector(role: MenuRole) -> Option<&'static CStr> {
    Some(match role {
        MenuRole::About => c"orderFrontStandardAboutPanel:",
        MenuRole::Hide => c"hide:",
        MenuRole::HideOthers => c"hideOtherApplications:",
        MenuRole::Unhide => c"unhideAllApplications:",
        MenuRole::Quit => c"terminate:",
        MenuRole::Front => c"arrangeInFront:",
        MenuRole::Minimize => c"performMiniaturize:",
        MenuRole::Zoom => c"performZoom:",
        MenuRole::Close => c"performClose:",
        MenuRole::Undo => c"undo:",
        MenuRole::Redo => c"redo:",
        MenuRole::Cut => c"cut:",
        MenuRole::Copy => c"copy:",
        MenuRole::Paste => c"paste:",
        MenuRole::Delete => c"delete:",
        MenuRole::SelectAll => c"selectAll:",
        MenuRole::ToggleFullScreen => c"toggleFullScreen:",
        _ => return None,
    })
}

/// Submenus AppKit manages itself once they are registered with `NSApplication`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialMenu {
    Services,
    Windows,
    Help,
}

impl SpecialMenu {
    pub fn for_role(role: MenuRole) -> Option<Self> {
        match role {
            MenuRole::Services => Some(SpecialMenu::Services),
            MenuRole::Window | MenuRole::WindowMenu => Some(SpecialMenu::Windows),
            MenuRole::Help => Some(SpecialMenu::Help),
            _ => None,
        }
    }
}

/// What happens when an item is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    None,
    /// Dispatch this registry id.
    Tag(u32),
    /// Send the role's standard selector to the first responder.
    Standard(MenuRole),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSpec<'a> {
    pub title: &'a str,
    pub key_equivalent: Option<KeyEquivalent>,
    pub enabled: bool,
    pub checked: bool,
    pub activation: Activation,
}

/// The AppKit operations the installer needs.
pub trait CocoaToolkit {
    type Menu;
    type Item;

    fn menu(&mut self, title: &str) -> Result<Self::Menu, InstallError>;
    fn separator(&mut self) -> Result<Self::Item, InstallError>;
    fn item(&mut self, spec: &ItemSpec<'_>) -> Result<Self::Item, InstallError>;
    fn set_submenu(&mut self, item: &Self::Item, submenu: &Self::Menu);
    fn add_item(&mut self, menu: &Self::Menu, item: &Self::Item);
    fn register_special(&mut self, menu: &Self::Menu, special: SpecialMenu);
    fn set_main_menu(&mut self, menu: Self::Menu) -> Result<(), InstallError>;
}

fn container_spec(item: &MenuItem) -> ItemSpec<'_> {
    ItemSpec {
        title: &item.label,
        key_equivalent: None,
        enabled: item.enabled,
        checked: false,
        activation: Activation::None,
    }
}

fn append_items<T: CocoaToolkit>(
    toolkit: &mut T,
    parent: &T::Menu,
    menu: &Menu,
    registry: &CallbackRegistry,
) -> Result<(), InstallError> {
    for item in menu.items() {
        if item.is_separator() {
            let separator = toolkit.separator()?;
            toolkit.add_item(parent, &separator);
        } else if item.is_submenu() {
            let entry = toolkit.item(&container_spec(&item))?;
            let submenu = toolkit.menu(&item.label)?;
            if let Some(children) = &item.submenu {
                append_items(toolkit, &submenu, children, registry)?;
            }
            if let Some(special) = item.role.and_then(SpecialMenu::for_role) {
                toolkit.register_special(&submenu, special);
            }
            toolkit.set_submenu(&entry, &submenu);
            toolkit.add_item(parent, &entry);
        } else if item.role == Some(MenuRole::Services) {
            // An empty submenu which AppKit fills with the services for the current selection.
            let entry = toolkit.item(&container_spec(&item))?;
            let services = toolkit.menu(&item.label)?;
            toolkit.register_special(&services, SpecialMenu::Services);
            toolkit.set_submenu(&entry, &services);
            toolkit.add_item(parent, &entry);
        } else {
            let activation = match (&item.action, item.role) {
                (Some(action), _) => Activation::Tag(registry.register(Some(action.clone()))),
                (None, Some(role)) if standard_selector(role).is_some() => {
                    Activation::Standard(role)
                }
                _ => Activation::None,
            };
            let spec = ItemSpec {
                title: &item.label,
                key_equivalent: item.parsed_accelerator().as_ref().and_then(key_equivalent),
                enabled: item.enabled,
                checked: item.checked,
                activation,
            };
            let entry = toolkit.item(&spec)?;
            toolkit.add_item(parent, &entry);
        }
    }
    Ok(())
}

/// Builds the `NSMenu` tree for `menu` and makes it the application's main menu.  Each
/// top-level item becomes one menu bar title; the first is the application menu.
pub fn install<T: CocoaToolkit>(
    toolkit: &mut T,
    menu: &Menu,
    window: &NativeWindow,
    registry: &Arc<CallbackRegistry>,
) -> Result<(), InstallError> {
    let NativeWindow::AppKit(_) = window else {
        return Err(InstallError::NoWindowHandle);
    };
    let main_menu = toolkit.menu("")?;
    append_items(toolkit, &main_menu, menu, registry)?;
    toolkit.set_main_menu(main_menu)?;
    log::debug!("installed Cocoa main menu with {} titles", menu.len());
    Ok(())
}


// End of File
