// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Ready-made menus for the common case.

use crate::{Action, Menu, MenuItem, MenuRole, Platform};

fn chord(mac: bool, on_mac: &str, elsewhere: &str) -> String {
    (if mac { on_mac } else { elsewhere }).to_owned()
}

fn role_item(id: &str, label: impl Into<String>, role: MenuRole) -> MenuItem {
    MenuItem::new(id, label).with_role(role)
}

/// The conventional menu bar of a desktop application: an application menu (macOS only), then
/// File, Edit, View, Window and Help, with the labels and shortcuts usual on `platform`.
pub fn default_app_menu(app_name: &str, platform: Platform) -> Menu {
    let mac = platform == Platform::Cocoa;
    let mut menu = Menu::new();

    if mac {
        let app = Menu::new()
            .and_then(role_item("about", format!("About {app_name}"), MenuRole::About))
            .and_then(MenuItem::separator())
            .and_then(role_item("services", "Services", MenuRole::Services))
            .and_then(MenuItem::separator())
            .and_then(
                role_item("hide", format!("Hide {app_name}"), MenuRole::Hide)
                    .with_accelerator("Command+H"),
            )
            .and_then(
                role_item("hideothers", "Hide Others", MenuRole::HideOthers)
                    .with_accelerator("Command+Alt+H"),
            )
            .and_then(role_item("unhide", "Show All", MenuRole::Unhide))
            .and_then(MenuItem::separator())
            .and_then(
                role_item("quit", format!("Quit {app_name}"), MenuRole::Quit)
                    .with_accelerator("Command+Q"),
            );
        menu = menu.and_then(MenuItem::submenu("app", app_name, app).with_role(MenuRole::AppMenu));
    }

    let file = Menu::new().and_then(
        role_item(
            "close",
            if mac { "Close" } else { "Exit" },
            if mac { MenuRole::Close } else { MenuRole::Quit },
        )
        .with_accelerator(chord(mac, "Command+W", "Alt+F4")),
    );
    menu = menu.and_then(MenuItem::submenu("file", "File", file).with_role(MenuRole::FileMenu));

    let edit = Menu::new()
        .and_then(
            role_item("undo", "Undo", MenuRole::Undo)
                .with_accelerator(chord(mac, "Command+Z", "Ctrl+Z")),
        )
        .and_then(
            role_item("redo", "Redo", MenuRole::Redo)
                .with_accelerator(chord(mac, "Shift+Command+Z", "Ctrl+Y")),
        )
        .and_then(MenuItem::separator())
        .and_then(
            role_item("cut", "Cut", MenuRole::Cut)
                .with_accelerator(chord(mac, "Command+X", "Ctrl+X")),
        )
        .and_then(
            role_item("copy", "Copy", MenuRole::Copy)
                .with_accelerator(chord(mac, "Command+C", "Ctrl+C")),
        )
        .and_then(
            role_item("paste", "Paste", MenuRole::Paste)
                .with_accelerator(chord(mac, "Command+V", "Ctrl+V")),
        )
        .and_then(MenuItem::separator())
        .and_then(
            role_item("selectall", "Select All", MenuRole::SelectAll)
                .with_accelerator(chord(mac, "Command+A", "Ctrl+A")),
        );
    menu = menu.and_then(MenuItem::submenu("edit", "Edit", edit).with_role(MenuRole::EditMenu));

    let view = Menu::new()
        .and_then(
            role_item("reload", "Reload", MenuRole::Reload)
                .with_accelerator(chord(mac, "Command+R", "Ctrl+R")),
        )
        .and_then(
            role_item("forcereload", "Force Reload", MenuRole::ForceReload)
                .with_accelerator(chord(mac, "Shift+Command+R", "Ctrl+Shift+R")),
        )
        .and_then(
            role_item("toggledevtools", "Toggle Developer Tools", MenuRole::ToggleDevTools)
                .with_accelerator(chord(mac, "Alt+Command+I", "Ctrl+Shift+I")),
        )
        .and_then(MenuItem::separator())
        .and_then(
            role_item("resetzoom", "Reset Zoom", MenuRole::ResetZoom)
                .with_accelerator(chord(mac, "Command+0", "Ctrl+0")),
        )
        .and_then(
            role_item("zoomin", "Zoom In", MenuRole::ZoomIn)
                .with_accelerator(chord(mac, "Command+=", "Ctrl+=")),
        )
        .and_then(
            role_item("zoomout", "Zoom Out", MenuRole::ZoomOut)
                .with_accelerator(chord(mac, "Command+-", "Ctrl+-")),
        )
        .and_then(MenuItem::separator())
        .and_then(
            role_item("togglefullscreen", "Toggle Full Screen", MenuRole::ToggleFullScreen)
                .with_accelerator(chord(mac, "Ctrl+Command+F", "F11")),
        );
    menu = menu.and_then(MenuItem::submenu("view", "View", view).with_role(MenuRole::ViewMenu));

    let mut window = Menu::new()
        .and_then(
            role_item("minimize", "Minimize", MenuRole::Minimize)
                .with_accelerator(chord(mac, "Command+M", "Ctrl+M")),
        )
        .and_then(role_item("zoom", "Zoom", MenuRole::Zoom));
    window = if mac {
        window
            .and_then(MenuItem::separator())
            .and_then(role_item("front", "Bring All to Front", MenuRole::Front))
    } else {
        // "close" already names the File menu's entry.
        window.and_then(
            role_item("window-close", "Close", MenuRole::Close).with_accelerator("Ctrl+W"),
        )
    };
    menu = menu.and_then(
        MenuItem::submenu("window", "Window", window).with_role(MenuRole::WindowMenu),
    );

    let about_name = app_name.to_owned();
    let help = Menu::new().and_then(
        role_item("help-about", format!("About {app_name}"), MenuRole::About)
            .on_click(move || log::info!("about {about_name}")),
    );
    menu.and_then(MenuItem::submenu("help", "Help", help).with_role(MenuRole::Help))
}

/// Callbacks for [`file_menu`].  Entries without a callback are left out of the menu.
#[derive(Clone, Debug, Default)]
pub struct FileActions {
    pub on_new: Option<Action>,
    pub on_open: Option<Action>,
    pub on_save: Option<Action>,
    pub on_exit: Option<Action>,
}

/// A File menu with New, Open, Save and Exit.
pub fn file_menu(actions: FileActions) -> MenuItem {
    let entries = [
        ("file_new", "New", "Ctrl+N", actions.on_new),
        ("file_open", "Open", "Ctrl+O", actions.on_open),
        ("file_save", "Save", "Ctrl+S", actions.on_save),
        ("file_exit", "Exit", "Alt+F4", actions.on_exit),
    ];
    let menu = entries
        .into_iter()
        .filter_map(|(id, label, keys, action)| {
            Some(MenuItem::new(id, label).with_accelerator(keys).with_action(action?))
        })
        .fold(Menu::new(), Menu::and_then);
    MenuItem::submenu("file_menu", "File", menu)
}

/// An Edit menu of clipboard commands, carried out by the platform.
pub fn edit_menu() -> MenuItem {
    let menu = Menu::new()
        .and_then(role_item("edit_cut", "Cut", MenuRole::Cut).with_accelerator("Ctrl+X"))
        .and_then(role_item("edit_copy", "Copy", MenuRole::Copy).with_accelerator("Ctrl+C"))
        .and_then(role_item("edit_paste", "Paste", MenuRole::Paste).with_accelerator("Ctrl+V"))
        .and_then(MenuItem::separator())
        .and_then(
            role_item("edit_select_all", "Select All", MenuRole::SelectAll)
                .with_accelerator("Ctrl+A"),
        );
    MenuItem::submenu("edit_menu", "Edit", menu)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_level_labels(menu: &Menu) -> Vec<String> {
        menu.items().into_iter().map(|item| item.label).collect()
    }

    #[test]
    fn mac_menu_starts_with_the_application() {
        let menu = default_app_menu("Velo", Platform::Cocoa);
        assert_eq!(
            top_level_labels(&menu),
            ["Velo", "File", "Edit", "View", "Window", "Help"]
        );
        let close = menu.find_by_id("close").unwrap();
        assert_eq!(close.label, "Close");
        assert_eq!(close.accelerator.as_deref(), Some("Command+W"));
        assert!(menu.find_by_id("front").is_some());
        assert!(menu.find_by_id("window-close").is_none());
    }

    #[test]
    fn other_platforms_use_exit() {
        let menu = default_app_menu("Velo", Platform::Win32);
        assert_eq!(top_level_labels(&menu), ["File", "Edit", "View", "Window", "Help"]);
        let exit = menu.find_by_id("close").unwrap();
        assert_eq!(exit.label, "Exit");
        assert_eq!(exit.role, Some(MenuRole::Quit));
        assert_eq!(
            menu.find_by_id("window-close").and_then(|item| item.accelerator),
            Some("Ctrl+W".to_owned())
        );
    }

    #[test]
    fn every_item_is_kept() {
        let menu = default_app_menu("Velo", Platform::Cocoa);
        let mut count = 0;
        menu.walk(|_, _| count += 1);
        // 6 menus, then 9 + 1 + 8 + 9 + 4 + 1 entries counting separators.
        assert_eq!(count, 38);
        assert!(menu.find_by_id("help-about").unwrap().action.is_some());
    }

    #[test]
    fn file_menu_skips_missing_actions() {
        let item = file_menu(FileActions {
            on_new: Some(Action::new(|| {})),
            on_exit: Some(Action::new(|| {})),
            ..FileActions::default()
        });
        let ids: Vec<_> = item
            .submenu
            .unwrap()
            .items()
            .into_iter()
            .map(|item| (item.id, item.accelerator))
            .collect();
        assert_eq!(
            ids,
            [
                ("file_new".to_owned(), Some("Ctrl+N".to_owned())),
                ("file_exit".to_owned(), Some("Alt+F4".to_owned())),
            ]
        );
    }

    #[test]
    fn edit_menu_is_role_based() {
        let item = edit_menu();
        let submenu = item.submenu.unwrap();
        assert_eq!(submenu.len(), 5);
        submenu.walk(|entry, _| assert!(entry.action.is_none()));
        assert_eq!(submenu.find_by_id("edit_copy").unwrap().role, Some(MenuRole::Copy));
    }
}

// End of File
