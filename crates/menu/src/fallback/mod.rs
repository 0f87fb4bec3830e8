// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! The scripted menu bar, used when no native menu can be installed.
//!
//! The menu is described as JSON data and handed, together with a static script, to the page
//! through a [`ContentBridge`].  Clicks and shortcut presses in the page call the bound
//! `invokeMenuAction(id)` function, which is looked up here and dispatched through the same
//! [`CallbackRegistry`] the native installers use.

use crate::{
    Action, CallbackRegistry, FallbackConfig, FallbackError, Menu, MenuItem, MenuItemKind,
    MenuRole, error::BridgeError,
};
use serde::Serialize;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

/// The function the page calls with an item id.
pub const BIND_NAME: &str = "invokeMenuAction";

const MENU_SCRIPT: &str = include_str!("menu.js");

/// The embedder's handle on the hosted page, usually a webview.
pub trait ContentBridge: Send + Sync {
    /// Exposes `handler` to the page as `window.<name>`.  The handler receives the call's
    /// argument, either the bare item id or the JSON argument array a webview passes along.
    fn bind(
        &self,
        name: &str,
        handler: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<(), BridgeError>;

    /// Runs `script` in the page.
    fn eval(&self, script: &str) -> Result<(), BridgeError>;
}

/// One entry of the menu as the page sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackItem {
    pub id: String,
    pub label: String,
    pub kind: MenuItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MenuRole>,
    /// The accelerator in normalized form (modifiers ordered Ctrl, Alt, Shift, Command).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    pub enabled: bool,
    pub checked: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FallbackItem>,
}

impl FallbackItem {
    fn from_item(item: &MenuItem) -> Self {
        let children = match &item.submenu {
            Some(submenu) if !item.is_separator() => describe(submenu),
            _ => Vec::new(),
        };
        Self {
            id: item.id.clone(),
            label: item.label.clone(),
            kind: if item.is_submenu() {
                MenuItemKind::Submenu
            } else {
                item.kind
            },
            role: item.role,
            shortcut: item
                .parsed_accelerator()
                .map(|accelerator| accelerator.to_string()),
            enabled: item.enabled,
            checked: item.checked,
            children,
        }
    }
}

/// The page's view of `menu`, in menu order.
pub fn describe(menu: &Menu) -> Vec<FallbackItem> {
    menu.items().iter().map(FallbackItem::from_item).collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    element_id: &'a str,
    keyboard_shortcuts: bool,
    items: Vec<FallbackItem>,
}

/// What a standard role does inside a page.
fn role_script(role: MenuRole) -> Option<&'static str> {
    Some(match role {
        MenuRole::Undo => "document.execCommand('undo');",
        MenuRole::Redo => "document.execCommand('redo');",
        MenuRole::Cut => "document.execCommand('cut');",
        MenuRole::Copy => "document.execCommand('copy');",
        MenuRole::Paste => "document.execCommand('paste');",
        MenuRole::Delete => "document.execCommand('delete');",
        MenuRole::SelectAll => "document.execCommand('selectAll');",
        MenuRole::Reload | MenuRole::ForceReload => "location.reload();",
        MenuRole::ResetZoom => "document.body.style.zoom = '';",
        MenuRole::ZoomIn => {
            "document.body.style.zoom = String((parseFloat(document.body.style.zoom) || 1) + 0.1);"
        }
        MenuRole::ZoomOut => concat!(
            "document.body.style.zoom = ",
            "String(Math.max(0.3, (parseFloat(document.body.style.zoom) || 1) - 0.1));"
        ),
        MenuRole::ToggleFullScreen => concat!(
            "if (document.fullscreenElement) { document.exitFullscreen(); } ",
            "else { document.documentElement.requestFullscreen(); }"
        ),
        MenuRole::Close | MenuRole::Quit => "window.close();",
        _ => return None,
    })
}

/// The argument of an `invokeMenuAction` call: a bare id, a JSON string, or a JSON array whose
/// first element is the id.
fn item_id(argument: &str) -> String {
    if let Ok(args) = serde_json::from_str::<Vec<String>>(argument) {
        if let Some(id) = args.into_iter().next() {
            return id;
        }
    }
    serde_json::from_str::<String>(argument).unwrap_or_else(|_| argument.to_owned())
}

/// The static script is only evaluated if the page does not have it yet, so a page keeps a
/// single set of listeners however often the menu is drawn.
fn install_script(data: &str) -> String {
    format!(
        "if (!window.veloInstallMenu) {{\n{MENU_SCRIPT}\n}}\nwindow.veloInstallMenu({data});\n"
    )
}

#[derive(Default)]
struct Routes {
    registry: Weak<CallbackRegistry>,
    ids: HashMap<String, u32>,
    disabled: HashSet<String>,
}

impl Routes {
    /// Disabled items do not activate, whoever calls the bound function.
    fn resolve(&self, id: &str) -> Option<(Arc<CallbackRegistry>, u32)> {
        if self.disabled.contains(id) {
            return None;
        }
        let tag = *self.ids.get(id)?;
        Some((self.registry.upgrade()?, tag))
    }
}

/// Renders a [`Menu`] into the page and routes its clicks.
pub struct FallbackRenderer {
    bridge: Arc<dyn ContentBridge>,
    config: FallbackConfig,
    routes: Arc<Mutex<Routes>>,
    bound: bool,
}

impl FallbackRenderer {
    pub fn new(bridge: Arc<dyn ContentBridge>, config: FallbackConfig) -> Self {
        Self {
            bridge,
            config,
            routes: Arc::default(),
            bound: false,
        }
    }

    fn routes(&self) -> MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers the menu's actions in `registry` and draws the menu, replacing any menu this
    /// renderer drew before.
    pub fn render(
        &mut self,
        menu: &Menu,
        registry: &Arc<CallbackRegistry>,
    ) -> Result<(), FallbackError> {
        let mut ids = HashMap::new();
        self.register(menu, registry, &mut ids);
        let mut disabled = HashSet::new();
        menu.walk(|item, _| {
            if !item.enabled && !item.id.is_empty() {
                disabled.insert(item.id.clone());
            }
        });

        if !self.bound {
            let routes = Arc::clone(&self.routes);
            self.bridge.bind(
                BIND_NAME,
                Box::new(move |argument| {
                    let id = item_id(&argument);
                    let target = routes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .resolve(&id);
                    match target {
                        Some((registry, tag)) => {
                            registry.dispatch(tag);
                        }
                        None => log::trace!("ignoring scripted menu action {id:?}"),
                    }
                }),
            )?;
            self.bound = true;
        }
        log::debug!("scripted menu has {} actionable items", ids.len());
        *self.routes() = Routes {
            registry: Arc::downgrade(registry),
            ids,
            disabled,
        };

        let payload = Payload {
            element_id: &self.config.element_id,
            keyboard_shortcuts: self.config.keyboard_shortcuts,
            items: describe(menu),
        };
        let data = serde_json::to_string(&payload)?;
        self.bridge.eval(&install_script(&data))?;
        Ok(())
    }

    /// Takes the drawn menu out of the page.  Its items stop dispatching until the next
    /// [`render`](Self::render).
    pub fn remove(&mut self) -> Result<(), FallbackError> {
        *self.routes() = Routes::default();
        let element_id = serde_json::to_string(&self.config.element_id)?;
        self.bridge.eval(&format!(
            "if (window.veloRemoveMenu) {{ window.veloRemoveMenu({element_id}); }}"
        ))?;
        Ok(())
    }

    /// Registers every leaf in pre-order.  When an id appears more than once the first
    /// occurrence keeps it.
    fn register(
        &self,
        menu: &Menu,
        registry: &Arc<CallbackRegistry>,
        ids: &mut HashMap<String, u32>,
    ) {
        for item in menu.items() {
            if item.is_separator() {
                continue;
            }
            if item.is_submenu() {
                if let Some(submenu) = &item.submenu {
                    self.register(submenu, registry, ids);
                }
                continue;
            }
            let action = item.action.clone().or_else(|| {
                let script = role_script(item.role?)?;
                let bridge = Arc::downgrade(&self.bridge);
                Some(Action::new(move || {
                    let Some(bridge) = bridge.upgrade() else {
                        return;
                    };
                    if let Err(err) = bridge.eval(script) {
                        log::warn!("scripted menu role failed: {err}");
                    }
                }))
            });
            let tag = registry.register(action);
            ids.entry(item.id.clone()).or_insert(tag);
        }
    }

    /// Pushes an item's new state to the drawn menu.
    pub fn update_item(&self, id: &str, enabled: bool, checked: bool) -> Result<(), FallbackError> {
        {
            let mut routes = self.routes();
            if enabled {
                routes.disabled.remove(id);
            } else {
                routes.disabled.insert(id.to_owned());
            }
        }
        let id = serde_json::to_string(id)?;
        self.bridge.eval(&format!(
            "if (window.veloMenuUpdate) {{ window.veloMenuUpdate({id}, {enabled}, {checked}); }}"
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = Box<dyn Fn(String) + Send + Sync>;

    #[derive(Default)]
    struct Page {
        handlers: Mutex<Vec<(String, Handler)>>,
        scripts: Mutex<Vec<String>>,
    }

    impl Page {
        fn call(&self, name: &str, argument: &str) {
            for (bound, handler) in self.handlers.lock().unwrap().iter() {
                if bound == name {
                    handler(argument.to_owned());
                }
            }
        }

        fn last_script(&self) -> String {
            self.scripts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    impl ContentBridge for Page {
        fn bind(&self, name: &str, handler: Handler) -> Result<(), BridgeError> {
            self.handlers.lock().unwrap().push((name.to_owned(), handler));
            Ok(())
        }

        fn eval(&self, script: &str) -> Result<(), BridgeError> {
            self.scripts.lock().unwrap().push(script.to_owned());
            Ok(())
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Action) {
        let count = Arc::new(AtomicUsize::new(0));
        let action = {
            let count = Arc::clone(&count);
            Action::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, action)
    }

    #[test]
    fn description_snapshot() {
        let menu = Menu::new()
            .and_then(MenuItem::new("new", "New").with_accelerator("shift+ctrl+n"))
            .and_then(MenuItem::separator())
            .and_then(MenuItem::new("copy", "Copy").with_role(MenuRole::Copy).disabled());
        insta::assert_json_snapshot!(describe(&menu), @r###"
        [
          {
            "id": "new",
            "label": "New",
            "kind": "normal",
            "shortcut": "Ctrl+Shift+N",
            "enabled": true,
            "checked": false
          },
          {
            "id": "",
            "label": "",
            "kind": "separator",
            "enabled": true,
            "checked": false
          },
          {
            "id": "copy",
            "label": "Copy",
            "kind": "normal",
            "role": "copy",
            "enabled": false,
            "checked": false
          }
        ]
        "###);
    }

    #[test]
    fn binds_once_across_renders() {
        let page = Arc::new(Page::default());
        let mut renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        let registry = Arc::new(CallbackRegistry::new());
        let menu = Menu::new().and_then(MenuItem::new("a", "A"));
        renderer.render(&menu, &registry).unwrap();
        renderer.render(&menu, &registry).unwrap();
        assert_eq!(page.handlers.lock().unwrap().len(), 1);
        assert_eq!(page.scripts.lock().unwrap().len(), 2);
        assert!(
            page.last_script()
                .contains("window.veloInstallMenu({\"elementId\":\"velo-native-menu\"")
        );
    }

    #[test]
    fn later_renders_reuse_the_page_script() {
        let page = Arc::new(Page::default());
        let mut renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        let registry = Arc::new(CallbackRegistry::new());
        let menu = Menu::new().and_then(MenuItem::new("new", "New").with_accelerator("Ctrl+N"));
        renderer.render(&menu, &registry).unwrap();
        renderer.render(&menu, &registry).unwrap();

        for script in page.scripts.lock().unwrap().iter() {
            assert!(script.starts_with("if (!window.veloInstallMenu) {\n"));
            assert!(
                script.contains("\n}\nwindow.veloInstallMenu({\"elementId\":\"velo-native-menu\"")
            );
            assert!(script.ends_with("\"enabled\":true,\"checked\":false}]});\n"));
        }
        // A listener left by an earlier evaluation must still be reachable for removal.
        assert!(MENU_SCRIPT.contains("window.veloMenuKeyListener = onKeyDown;"));
        assert!(MENU_SCRIPT.contains("removeEventListener('keydown', window.veloMenuKeyListener"));
        assert!(!MENU_SCRIPT.contains("var keyListener"));
    }

    #[test]
    fn removed_menu_stops_dispatching() {
        let page = Arc::new(Page::default());
        let mut renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        let registry = Arc::new(CallbackRegistry::new());
        let (count, action) = counter();
        let menu = Menu::new().and_then(MenuItem::new("new", "New").with_action(action));
        renderer.render(&menu, &registry).unwrap();
        renderer.remove().unwrap();

        page.call(BIND_NAME, "new");
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(
            page.last_script(),
            r#"if (window.veloRemoveMenu) { window.veloRemoveMenu("velo-native-menu"); }"#
        );

        renderer.render(&menu, &registry).unwrap();
        page.call(BIND_NAME, "new");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_items_ignore_calls() {
        let page = Arc::new(Page::default());
        let mut renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        let registry = Arc::new(CallbackRegistry::new());
        let (count, action) = counter();
        let menu =
            Menu::new().and_then(MenuItem::new("save", "Save").with_action(action).disabled());
        renderer.render(&menu, &registry).unwrap();

        page.call(BIND_NAME, "save");
        assert_eq!(count.load(Ordering::SeqCst), 0);

        renderer.update_item("save", true, false).unwrap();
        page.call(BIND_NAME, "save");
        assert_eq!(count.load(Ordering::SeqCst), 1);

        renderer.update_item("save", false, false).unwrap();
        page.call(BIND_NAME, "save");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clicks_dispatch_the_first_item_with_the_id() {
        let page = Arc::new(Page::default());
        let mut renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        let registry = Arc::new(CallbackRegistry::new());
        let (first, first_action) = counter();
        let (second, second_action) = counter();
        let nested =
            Menu::new().and_then(MenuItem::new("dup", "Nested").with_action(second_action));
        let menu = Menu::new()
            .and_then(MenuItem::new("dup", "Top").with_action(first_action))
            .and_then(MenuItem::submenu("more", "More", Menu::new()));
        // Bypass the duplicate check the way a caller editing a nested menu directly would.
        menu.update("more", |item| item.submenu = Some(nested));

        renderer.render(&menu, &registry).unwrap();
        page.call(BIND_NAME, "dup");
        page.call(BIND_NAME, "[\"dup\"]");
        page.call(BIND_NAME, "missing");
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn role_items_run_page_behaviour() {
        let page = Arc::new(Page::default());
        let mut renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        let registry = Arc::new(CallbackRegistry::new());
        let menu = Menu::new()
            .and_then(MenuItem::new("copy", "Copy").with_role(MenuRole::Copy))
            .and_then(MenuItem::new("about", "About").with_role(MenuRole::About));
        renderer.render(&menu, &registry).unwrap();
        assert_eq!(registry.len(), 1);

        page.call(BIND_NAME, "copy");
        assert_eq!(page.last_script(), "document.execCommand('copy');");
        page.call(BIND_NAME, "about");
        assert_eq!(page.last_script(), "document.execCommand('copy');");
    }

    #[test]
    fn update_item_quotes_the_id() {
        let page = Arc::new(Page::default());
        let renderer = FallbackRenderer::new(page.clone(), FallbackConfig::default());
        renderer.update_item("say \"hi\"", false, true).unwrap();
        assert_eq!(
            page.last_script(),
            r#"if (window.veloMenuUpdate) { window.veloMenuUpdate("say \"hi\"", false, true); }"#
        );
    }

    #[test]
    fn arguments_are_unwrapped() {
        assert_eq!(item_id("New"), "New");
        assert_eq!(item_id("\"New\""), "New");
        assert_eq!(item_id("[\"New\"]"), "New");
        assert_eq!(item_id("[]"), "[]");
    }
}

// End of File
