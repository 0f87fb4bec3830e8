// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! GTK 3 menu bars: a `GtkMenuBar` packed above the window's content, with `activate` handlers
//! that carry the registry id of each item.

use crate::{
    Action, CallbackRegistry, InstallError, Menu, MenuItem, MenuItemKind, MenuRole, NativeWindow,
};
use keyboard::{Accelerator, Key, ModifierKeys, NamedKey};
use std::{ffi::c_void, ptr::NonNull, sync::Arc};

/// How a leaf item draws its indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    None,
    Check,
    Radio,
}

/// The GTK widget operations the installer needs.
pub trait GtkToolkit {
    type Widget: Clone;

    fn menu_bar(&mut self) -> Result<Self::Widget, InstallError>;
    fn menu(&mut self) -> Result<Self::Widget, InstallError>;
    fn separator(&mut self) -> Result<Self::Widget, InstallError>;
    fn item(
        &mut self,
        label: &str,
        indicator: Indicator,
        active: bool,
    ) -> Result<Self::Widget, InstallError>;
    fn set_sensitive(&mut self, item: &Self::Widget, sensitive: bool);
    fn set_submenu(&mut self, item: &Self::Widget, submenu: &Self::Widget);
    fn append(&mut self, shell: &Self::Widget, item: &Self::Widget);
    /// Arranges for `registry.dispatch(tag)` when `item` is activated.
    fn connect_activate(&mut self, item: &Self::Widget, tag: u32, registry: &Arc<CallbackRegistry>);
    fn role_action(&mut self, window: NonNull<c_void>, role: MenuRole) -> Option<Action>;
    /// Replaces the window's menu bar with `menu_bar` and installs an accelerator group holding
    /// `accelerators`.
    fn attach(
        &mut self,
        window: NonNull<c_void>,
        menu_bar: &Self::Widget,
        accelerators: &[(Self::Widget, String)],
    ) -> Result<(), InstallError>;
}

fn key_name(key: Key) -> Option<String> {
    let name = match key {
        Key::Char(c) if c.is_ascii_alphanumeric() => {
            return Some(c.to_ascii_lowercase().to_string());
        }
        Key::Char(c) => match c {
            '=' => "equal",
            '-' => "minus",
            '+' => "plus",
            ',' => "comma",
            '.' => "period",
            '/' => "slash",
            '\\' => "backslash",
            ';' => "semicolon",
            '\'' => "apostrophe",
            '[' => "bracketleft",
            ']' => "bracketright",
            '`' => "grave",
            _ => return None,
        },
        Key::Function(n) => return Some(format!("F{n}")),
        Key::Named(named) => match named {
            NamedKey::Backspace => "BackSpace",
            NamedKey::Delete => "Delete",
            NamedKey::Enter => "Return",
            NamedKey::Tab => "Tab",
            NamedKey::Escape => "Escape",
            NamedKey::Space => "space",
            NamedKey::Up => "Up",
            NamedKey::Down => "Down",
            NamedKey::Left => "Left",
            NamedKey::Right => "Right",
            NamedKey::Home => "Home",
            NamedKey::End => "End",
            NamedKey::PageUp => "Page_Up",
            NamedKey::PageDown => "Page_Down",
            NamedKey::Insert => "Insert",
        },
    };
    Some(name.to_owned())
}

/// The chord in `gtk_accelerator_parse` syntax, e.g. `<Control><Shift>i`.
pub fn accelerator_name(accelerator: &Accelerator) -> Option<String> {
    let key = key_name(accelerator.key)?;
    let modifiers = accelerator.modifiers;
    let mut name = String::new();
    if modifiers.intersects(ModifierKeys::CONTROL | ModifierKeys::COMMAND) {
        name.push_str("<Control>");
    }
    if modifiers.contains(ModifierKeys::OPTION) {
        name.push_str("<Alt>");
    }
    if modifiers.contains(ModifierKeys::SHIFT) {
        name.push_str("<Shift>");
    }
    name.push_str(&key);
    Some(name)
}

struct Builder<'a, T: GtkToolkit> {
    toolkit: &'a mut T,
    window: NonNull<c_void>,
    registry: &'a Arc<CallbackRegistry>,
    accelerators: Vec<(T::Widget, String)>,
}

impl<T: GtkToolkit> Builder<'_, T> {
    fn append_items(&mut self, shell: &T::Widget, menu: &Menu) -> Result<(), InstallError> {
        for item in menu.items() {
            let widget = if item.is_separator() {
                self.toolkit.separator()?
            } else if item.is_submenu() {
                self.submenu(&item)?
            } else {
                self.leaf(&item)?
            };
            self.toolkit.append(shell, &widget);
        }
        Ok(())
    }

    fn submenu(&mut self, item: &MenuItem) -> Result<T::Widget, InstallError> {
        let widget = self.toolkit.item(&item.label, Indicator::None, false)?;
        self.toolkit.set_sensitive(&widget, item.enabled);
        let submenu = self.toolkit.menu()?;
        if let Some(children) = &item.submenu {
            self.append_items(&submenu, children)?;
        }
        self.toolkit.set_submenu(&widget, &submenu);
        Ok(widget)
    }

    fn leaf(&mut self, item: &MenuItem) -> Result<T::Widget, InstallError> {
        let indicator = match item.kind {
            MenuItemKind::Checkbox => Indicator::Check,
            MenuItemKind::Radio => Indicator::Radio,
            _ => Indicator::None,
        };
        let widget = self.toolkit.item(&item.label, indicator, item.checked)?;
        self.toolkit.set_sensitive(&widget, item.enabled);

        let action = item.action.clone().or_else(|| {
            item.role
                .and_then(|role| self.toolkit.role_action(self.window, role))
        });
        let tag = self.registry.register(action);
        if tag != CallbackRegistry::NO_CALLBACK {
            self.toolkit.connect_activate(&widget, tag, self.registry);
        }
        if let Some(name) = item.parsed_accelerator().as_ref().and_then(accelerator_name) {
            self.accelerators.push((widget.clone(), name));
        }
        Ok(widget)
    }
}

pub fn install<T: GtkToolkit>(
    toolkit: &mut T,
    menu: &Menu,
    window: &NativeWindow,
    registry: &Arc<CallbackRegistry>,
) -> Result<(), InstallError> {
    let NativeWindow::Gtk(window) = *window else {
        return Err(InstallError::NoWindowHandle);
    };
    let menu_bar = toolkit.menu_bar()?;
    let mut builder = Builder {
        toolkit: &mut *toolkit,
        window,
        registry,
        accelerators: Vec::new(),
    };
    builder.append_items(&menu_bar, menu)?;
    let accelerators = builder.accelerators;
    toolkit.attach(window, &menu_bar, &accelerators)?;
    log::debug!("installed GTK menu bar with {} accelerators", accelerators.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(chord: &str) -> Option<String> {
        accelerator_name(&Accelerator::parse(chord).unwrap())
    }

    #[test]
    fn accelerator_names() {
        assert_eq!(name("Ctrl+Shift+I").as_deref(), Some("<Control><Shift>i"));
        assert_eq!(name("Command+Q").as_deref(), Some("<Control>q"));
        assert_eq!(name("Alt+F4").as_deref(), Some("<Alt>F4"));
        assert_eq!(name("Ctrl+=").as_deref(), Some("<Control>equal"));
        assert_eq!(name("Ctrl+PageDown").as_deref(), Some("<Control>Page_Down"));
        assert_eq!(name("Ctrl+@"), None);
    }

    /// Widgets are indices into `widgets`, which describes each one.
    #[derive(Default)]
    struct Recorder {
        widgets: Vec<String>,
        children: Vec<(usize, usize)>,
        activations: Vec<(usize, u32)>,
        attached: Option<(usize, Vec<(usize, String)>)>,
    }

    impl Recorder {
        fn widget(&mut self, what: String) -> usize {
            self.widgets.push(what);
            self.widgets.len() - 1
        }
    }

    impl GtkToolkit for Recorder {
        type Widget = usize;

        fn menu_bar(&mut self) -> Result<usize, InstallError> {
            Ok(self.widget("bar".into()))
        }

        fn menu(&mut self) -> Result<usize, InstallError> {
            Ok(self.widget("menu".into()))
        }

        fn separator(&mut self) -> Result<usize, InstallError> {
            Ok(self.widget("---".into()))
        }

        fn item(
            &mut self,
            label: &str,
            indicator: Indicator,
            active: bool,
        ) -> Result<usize, InstallError> {
            Ok(self.widget(format!("{label} {indicator:?} {active}")))
        }

        fn set_sensitive(&mut self, item: &usize, sensitive: bool) {
            if !sensitive {
                self.widgets[*item].push_str(" (insensitive)");
            }
        }

        fn set_submenu(&mut self, item: &usize, submenu: &usize) {
            self.children.push((*item, *submenu));
        }

        fn append(&mut self, shell: &usize, item: &usize) {
            self.children.push((*shell, *item));
        }

        fn connect_activate(&mut self, item: &usize, tag: u32, _registry: &Arc<CallbackRegistry>) {
            self.activations.push((*item, tag));
        }

        fn role_action(&mut self, _window: NonNull<c_void>, role: MenuRole) -> Option<Action> {
            (role == MenuRole::Quit).then(|| Action::new(|| {}))
        }

        fn attach(
            &mut self,
            _window: NonNull<c_void>,
            menu_bar: &usize,
            accelerators: &[(usize, String)],
        ) -> Result<(), InstallError> {
            self.attached = Some((*menu_bar, accelerators.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn builds_the_widget_tree() {
        let menu = Menu::new().and_then(MenuItem::submenu(
            "file",
            "File",
            Menu::new()
                .and_then(MenuItem::new("open", "Open").with_accelerator("Ctrl+O").on_click(|| {}))
                .and_then(MenuItem::separator())
                .and_then(MenuItem::radio("tabs", "Tabs", true).disabled())
                .and_then(MenuItem::new("quit", "Quit").with_role(MenuRole::Quit)),
        ));
        let registry = Arc::new(CallbackRegistry::new());
        let mut recorder = Recorder::default();
        let window = NativeWindow::Gtk(NonNull::dangling());
        install(&mut recorder, &menu, &window, &registry).unwrap();

        assert_eq!(
            recorder.widgets,
            [
                "bar",
                "File None false",
                "menu",
                "Open None false",
                "---",
                "Tabs Radio true (insensitive)",
                "Quit None false",
            ]
        );
        assert_eq!(
            recorder.children,
            [(2, 3), (2, 4), (2, 5), (2, 6), (1, 2), (0, 1)]
        );
        assert_eq!(recorder.activations, [(3, 1), (6, 2)]);
        assert_eq!(recorder.attached, Some((0, vec![(3, "<Control>o".to_owned())])));
    }

    #[test]
    fn requires_a_gtk_window() {
        let registry = Arc::new(CallbackRegistry::new());
        let window = NativeWindow::Win32(std::num::NonZeroIsize::new(1).unwrap());
        assert_eq!(
            install(&mut Recorder::default(), &Menu::new(), &window, &registry),
            Err(InstallError::NoWindowHandle)
        );
    }
}

// End of File
