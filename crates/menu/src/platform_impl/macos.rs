// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use crate::{
    CallbackRegistry, InstallError, Menu, NativeWindow, Platform, PlatformInstaller,
    native::cocoa::{self, Activation, CocoaToolkit, ItemSpec, SpecialMenu},
};
use keyboard::ModifierKeys;
use objc2::{
    DefinedClass, define_class, msg_send,
    rc::{Allocated, Retained},
    runtime::{NSObjectProtocol, Sel},
    sel,
};
use objc2_app_kit::{
    NSApplication, NSControlStateValueOff, NSControlStateValueOn, NSEventModifierFlags, NSMenu,
    NSMenuItem,
};
use objc2_foundation::{MainThreadMarker, NSString};
use std::sync::{Arc, Weak};

struct VeloMenuItemIvars {
    registry: Weak<CallbackRegistry>,
}

define_class!(
    // A menu item which is its own target, and dispatches its tag when chosen.
    #[unsafe(super(NSMenuItem))]
    #[name = "VeloMenuItem"]
    #[ivars = VeloMenuItemIvars]
    struct VeloMenuItem;

    impl VeloMenuItem {
        #[unsafe(method(handleMenuClick:))]
        fn handle_menu_click(&self, _sender: Option<&NSMenuItem>) {
            let tag: isize = unsafe { msg_send![self, tag] };
            let Ok(tag) = u32::try_from(tag) else {
                return;
            };
            if let Some(registry) = self.ivars().registry.upgrade() {
                registry.dispatch(tag);
            }
        }
    }

    unsafe impl NSObjectProtocol for VeloMenuItem {}
);

#[allow(non_snake_case)]
impl VeloMenuItem {
    unsafe fn initWithTitle_action_keyEquivalent(
        this: Allocated<Self>,
        string: &NSString,
        selector: Option<Sel>,
        char_code: &NSString,
        registry: Weak<CallbackRegistry>,
    ) -> Retained<Self> {
        let this = this.set_ivars(VeloMenuItemIvars { registry });
        unsafe {
            msg_send![super(this), initWithTitle:string, action:selector, keyEquivalent:char_code]
        }
    }
}

fn modifier_mask(modifiers: ModifierKeys) -> NSEventModifierFlags {
    let mut mask = NSEventModifierFlags::empty();
    if modifiers.contains(ModifierKeys::SHIFT) {
        mask.insert(NSEventModifierFlags::Shift);
    }
    if modifiers.contains(ModifierKeys::CONTROL) {
        mask.insert(NSEventModifierFlags::Control);
    }
    if modifiers.contains(ModifierKeys::OPTION) {
        mask.insert(NSEventModifierFlags::Option);
    }
    if modifiers.contains(ModifierKeys::COMMAND) {
        mask.insert(NSEventModifierFlags::Command);
    }
    mask
}

struct AppKit {
    mtm: MainThreadMarker,
    registry: Weak<CallbackRegistry>,
}

impl CocoaToolkit for AppKit {
    type Menu = Retained<NSMenu>;
    type Item = Retained<NSMenuItem>;

    fn menu(&mut self, title: &str) -> Result<Retained<NSMenu>, InstallError> {
        Ok(NSMenu::initWithTitle(
            self.mtm.alloc::<NSMenu>(),
            &NSString::from_str(title),
        ))
    }

    fn separator(&mut self) -> Result<Retained<NSMenuItem>, InstallError> {
        Ok(NSMenuItem::separatorItem(self.mtm))
    }

    #[allow(unused_unsafe)]
    fn item(&mut self, spec: &ItemSpec<'_>) -> Result<Retained<NSMenuItem>, InstallError> {
        let title = NSString::from_str(spec.title);
        let key = NSString::from_str(spec.key_equivalent.as_ref().map_or("", |k| k.key.as_str()));
        let item: Retained<NSMenuItem> = match spec.activation {
            Activation::Tag(tag) => {
                let tag = isize::try_from(tag)
                    .map_err(|err| InstallError::allocation("NSMenuItem tag", err))?;
                let item = unsafe {
                    VeloMenuItem::initWithTitle_action_keyEquivalent(
                        self.mtm.alloc::<VeloMenuItem>(),
                        &title,
                        Some(sel!(handleMenuClick:)),
                        &key,
                        self.registry.clone(),
                    )
                };
                unsafe {
                    item.setTag(tag);
                    item.setTarget(Some(&item));
                }
                Retained::into_super(item)
            }
            Activation::Standard(role) => {
                let action = cocoa::standard_selector(role).map(Sel::register);
                unsafe {
                    NSMenuItem::initWithTitle_action_keyEquivalent(
                        self.mtm.alloc::<NSMenuItem>(),
                        &title,
                        action,
                        &key,
                    )
                }
            }
            Activation::None => unsafe {
                NSMenuItem::initWithTitle_action_keyEquivalent(
                    self.mtm.alloc::<NSMenuItem>(),
                    &title,
                    None,
                    &key,
                )
            },
        };
        if let Some(equivalent) = &spec.key_equivalent {
            item.setKeyEquivalentModifierMask(modifier_mask(equivalent.modifiers));
        }
        unsafe {
            item.setEnabled(spec.enabled);
            item.setState(if spec.checked {
                NSControlStateValueOn
            } else {
                NSControlStateValueOff
            });
        }
        Ok(item)
    }

    fn set_submenu(&mut self, item: &Retained<NSMenuItem>, submenu: &Retained<NSMenu>) {
        item.setSubmenu(Some(submenu));
    }

    fn add_item(&mut self, menu: &Retained<NSMenu>, item: &Retained<NSMenuItem>) {
        menu.addItem(item);
    }

    #[allow(unused_unsafe)]
    fn register_special(&mut self, menu: &Retained<NSMenu>, special: SpecialMenu) {
        let app = NSApplication::sharedApplication(self.mtm);
        unsafe {
            match special {
                SpecialMenu::Services => app.setServicesMenu(Some(menu)),
                SpecialMenu::Windows => app.setWindowsMenu(Some(menu)),
                SpecialMenu::Help => app.setHelpMenu(Some(menu)),
            }
        }
    }

    fn set_main_menu(&mut self, menu: Retained<NSMenu>) -> Result<(), InstallError> {
        let app = NSApplication::sharedApplication(self.mtm);
        app.setMainMenu(Some(&menu));
        Ok(())
    }
}

pub(crate) struct AppKitInstaller;

impl PlatformInstaller for AppKitInstaller {
    fn platform(&self) -> Platform {
        Platform::Cocoa
    }

    fn install(
        &mut self,
        menu: &Menu,
        window: &NativeWindow,
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), InstallError> {
        let Some(mtm) = MainThreadMarker::new() else {
            return Err(InstallError::allocation(
                "NSMenu",
                "menus can only be built on the main thread",
            ));
        };
        let mut toolkit = AppKit {
            mtm,
            registry: Arc::downgrade(registry),
        };
        cocoa::install(&mut toolkit, menu, window, registry)
    }
}

pub(crate) fn native_installer() -> Box<dyn PlatformInstaller> {
    Box::new(AppKitInstaller)
}

// End of File
