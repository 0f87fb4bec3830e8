// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! GTK 3 menu bars.  The bar is packed into a vertical box above whatever the window already
//! contains; reinstalling swaps the bar in place.

use crate::{
    Action, CallbackRegistry, InstallError, Menu, MenuRole, NativeWindow, Platform,
    PlatformInstaller,
    native::gtk::{self as menus, GtkToolkit, Indicator},
};
use gtk::{glib, glib::translate::from_glib_none, prelude::*};
use std::{ffi::c_void, ptr::NonNull, sync::Arc};

struct Installed {
    menu_bar: glib::SendWeakRef<gtk::Widget>,
    accel_group: glib::SendWeakRef<gtk::AccelGroup>,
}

fn gtk_window(window: NonNull<c_void>) -> gtk::Window {
    // SAFETY: NativeWindow::Gtk always holds a live GtkWindow*, and we only get here on the
    // GTK main thread.
    unsafe { from_glib_none(window.as_ptr() as *mut gtk::ffi::GtkWindow) }
}

struct Gtk3<'a> {
    installed: &'a mut Option<Installed>,
}

impl GtkToolkit for Gtk3<'_> {
    type Widget = gtk::Widget;

    fn menu_bar(&mut self) -> Result<gtk::Widget, InstallError> {
        Ok(gtk::MenuBar::new().upcast())
    }

    fn menu(&mut self) -> Result<gtk::Widget, InstallError> {
        Ok(gtk::Menu::new().upcast())
    }

    fn separator(&mut self) -> Result<gtk::Widget, InstallError> {
        Ok(gtk::SeparatorMenuItem::new().upcast())
    }

    fn item(
        &mut self,
        label: &str,
        indicator: Indicator,
        active: bool,
    ) -> Result<gtk::Widget, InstallError> {
        Ok(match indicator {
            Indicator::None => gtk::MenuItem::with_label(label).upcast(),
            Indicator::Check | Indicator::Radio => {
                let item = gtk::CheckMenuItem::with_label(label);
                item.set_draw_as_radio(indicator == Indicator::Radio);
                item.set_active(active);
                item.upcast()
            }
        })
    }

    fn set_sensitive(&mut self, item: &gtk::Widget, sensitive: bool) {
        item.set_sensitive(sensitive);
    }

    fn set_submenu(&mut self, item: &gtk::Widget, submenu: &gtk::Widget) {
        if let (Some(item), Some(submenu)) = (
            item.downcast_ref::<gtk::MenuItem>(),
            submenu.downcast_ref::<gtk::Menu>(),
        ) {
            item.set_submenu(Some(submenu));
        }
    }

    fn append(&mut self, shell: &gtk::Widget, item: &gtk::Widget) {
        if let (Some(shell), Some(item)) = (
            shell.downcast_ref::<gtk::MenuShell>(),
            item.downcast_ref::<gtk::MenuItem>(),
        ) {
            shell.append(item);
        }
    }

    fn connect_activate(&mut self, item: &gtk::Widget, tag: u32, registry: &Arc<CallbackRegistry>) {
        let Some(item) = item.downcast_ref::<gtk::MenuItem>() else {
            return;
        };
        let registry = Arc::downgrade(registry);
        item.connect_activate(move |_| {
            if let Some(registry) = registry.upgrade() {
                registry.dispatch(tag);
            }
        });
    }

    fn role_action(&mut self, window: NonNull<c_void>, role: MenuRole) -> Option<Action> {
        let window = glib::SendWeakRef::from(gtk_window(window).downgrade());
        match role {
            MenuRole::Quit => Some(Action::new(gtk::main_quit)),
            MenuRole::Close => Some(Action::new(move || {
                if let Some(window) = window.upgrade() {
                    window.close();
                }
            })),
            MenuRole::Minimize => Some(Action::new(move || {
                if let Some(window) = window.upgrade() {
                    window.iconify();
                }
            })),
            _ => None,
        }
    }

    fn attach(
        &mut self,
        window: NonNull<c_void>,
        menu_bar: &gtk::Widget,
        accelerators: &[(gtk::Widget, String)],
    ) -> Result<(), InstallError> {
        let window = gtk_window(window);

        let accel_group = gtk::AccelGroup::new();
        for (widget, name) in accelerators {
            let (key, modifiers) = gtk::accelerator_parse(name);
            if key != 0 {
                widget.add_accelerator(
                    "activate",
                    &accel_group,
                    key,
                    modifiers,
                    gtk::AccelFlags::VISIBLE,
                );
            }
        }

        let previous = self.installed.take();
        let old_bar = previous.as_ref().and_then(|installed| installed.menu_bar.upgrade());
        let old_box = old_bar
            .as_ref()
            .and_then(|bar| bar.parent())
            .and_then(|parent| parent.downcast::<gtk::Box>().ok());

        match (old_bar, old_box) {
            (Some(old_bar), Some(vbox)) => {
                vbox.remove(&old_bar);
                vbox.pack_start(menu_bar, false, false, 0);
                vbox.reorder_child(menu_bar, 0);
            }
            _ => {
                let vbox = gtk::Box::new(gtk::Orientation::Vertical, 0);
                vbox.pack_start(menu_bar, false, false, 0);
                if let Some(content) = window.child() {
                    window.remove(&content);
                    vbox.pack_start(&content, true, true, 0);
                }
                window.add(&vbox);
            }
        }
        if let Some(old_group) = previous.and_then(|installed| installed.accel_group.upgrade()) {
            window.remove_accel_group(&old_group);
        }
        window.add_accel_group(&accel_group);
        window.show_all();

        *self.installed = Some(Installed {
            menu_bar: menu_bar.downgrade().into(),
            accel_group: accel_group.downgrade().into(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct GtkInstaller {
    installed: Option<Installed>,
}

impl PlatformInstaller for GtkInstaller {
    fn platform(&self) -> Platform {
        Platform::Gtk
    }

    fn install(
        &mut self,
        menu: &Menu,
        window: &NativeWindow,
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError> {
        if !gtk::is_initialized_main_thread() {
            return Err(InstallError::allocation(
                "GtkMenuBar",
                "GTK is not initialized on this thread",
            ));
        }
        let mut toolkit = Gtk3 {
            installed: &mut self.installed,
        };
        menus::install(&mut toolkit, menu, window, registry)
    }
}

pub(crate) fn native_installer() -> Box<dyn PlatformInstaller> {
    Box::new(GtkInstaller::default())
}

// End of File
