// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use crate::MenuError;
use keyboard::Accelerator;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// How an item is presented and whether it can hold children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuItemKind {
    #[default]
    Normal,
    Separator,
    Submenu,
    Checkbox,
    Radio,
}

/// A semantic tag which lets an installer substitute the platform's own implementation of a
/// standard command (the responder-chain `copy:` on macOS, `WM_COPY` on Windows, and so on).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuRole {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    Delete,
    SelectAll,
    Reload,
    ForceReload,
    ToggleDevTools,
    ResetZoom,
    ZoomIn,
    ZoomOut,
    #[serde(rename = "togglefullscreen")]
    ToggleFullScreen,
    Minimize,
    Close,
    Quit,
    // Only meaningful on macOS.
    About,
    Services,
    Hide,
    HideOthers,
    Unhide,
    Front,
    Window,
    Help,
    Zoom,
    // Top-level containers.
    AppMenu,
    FileMenu,
    EditMenu,
    ViewMenu,
    WindowMenu,
}

impl MenuRole {
    pub fn is_macos_only(self) -> bool {
        matches!(
            self,
            MenuRole::About
                | MenuRole::Services
                | MenuRole::Hide
                | MenuRole::HideOthers
                | MenuRole::Unhide
                | MenuRole::Front
                | MenuRole::Window
                | MenuRole::Help
                | MenuRole::Zoom
        )
    }

    /// Container roles name a whole submenu rather than a command.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            MenuRole::AppMenu
                | MenuRole::FileMenu
                | MenuRole::EditMenu
                | MenuRole::ViewMenu
                | MenuRole::WindowMenu
        )
    }
}

/// The callback attached to a menu item.  Cloning an `Action` shares the same closure.
#[derive(Clone)]
pub struct Action(Arc<dyn Fn() + Send + Sync>);

impl Action {
    pub fn new(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

/// Positioning hints from menu templates.  They travel with the item but no installer reorders
/// items based on them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub before: Option<String>,
    pub after: Option<String>,
    pub before_group_containing: Option<String>,
    pub after_group_containing: Option<String>,
}

impl Placement {
    pub fn is_empty(&self) -> bool {
        self.before.is_none()
            && self.after.is_none()
            && self.before_group_containing.is_none()
            && self.after_group_containing.is_none()
    }
}

/// One entry of a menu.  Items are plain data, built with the chaining constructors below and
/// handed to a [`Menu`] by value.
#[derive(Clone, Debug)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub kind: MenuItemKind,
    pub role: Option<MenuRole>,
    /// A chord in `[Modifier+]*Key` notation, e.g. `"Ctrl+Shift+I"`.
    pub accelerator: Option<String>,
    pub enabled: bool,
    pub checked: bool,
    pub action: Option<Action>,
    pub submenu: Option<Menu>,
    pub placement: Placement,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: MenuItemKind::Normal,
            role: None,
            accelerator: None,
            enabled: true,
            checked: false,
            action: None,
            submenu: None,
            placement: Placement::default(),
        }
    }

    pub fn separator() -> Self {
        Self {
            kind: MenuItemKind::Separator,
            ..Self::new("", "")
        }
    }

    pub fn submenu(id: impl Into<String>, label: impl Into<String>, menu: Menu) -> Self {
        Self {
            kind: MenuItemKind::Submenu,
            submenu: Some(menu),
            ..Self::new(id, label)
        }
    }

    pub fn checkbox(id: impl Into<String>, label: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: MenuItemKind::Checkbox,
            checked,
            ..Self::new(id, label)
        }
    }

    pub fn radio(id: impl Into<String>, label: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: MenuItemKind::Radio,
            checked,
            ..Self::new(id, label)
        }
    }

    pub fn with_role(mut self, role: MenuRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_accelerator(mut self, chord: impl Into<String>) -> Self {
        self.accelerator = Some(chord.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn on_click(self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_action(Action::new(callback))
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn before(mut self, id: impl Into<String>) -> Self {
        self.placement.before = Some(id.into());
        self
    }

    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.placement.after = Some(id.into());
        self
    }

    pub fn before_group_containing(mut self, id: impl Into<String>) -> Self {
        self.placement.before_group_containing = Some(id.into());
        self
    }

    pub fn after_group_containing(mut self, id: impl Into<String>) -> Self {
        self.placement.after_group_containing = Some(id.into());
        self
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemKind::Separator
    }

    /// True for anything installers render as a container: an explicit submenu item, or any
    /// other item which was given children.
    pub fn is_submenu(&self) -> bool {
        !self.is_separator()
            && (self.kind == MenuItemKind::Submenu
                || self.submenu.as_ref().is_some_and(|menu| !menu.is_empty()))
    }

    /// The accelerator parsed into its modifiers and key.  A chord which cannot be understood is
    /// logged and treated as no accelerator at all.
    pub fn parsed_accelerator(&self) -> Option<Accelerator> {
        let chord = self.accelerator.as_deref()?;
        match Accelerator::parse(chord) {
            Ok(accelerator) => Some(accelerator),
            Err(err) => {
                log::debug!("ignoring accelerator of menu item {:?}: {err}", self.id);
                None
            }
        }
    }
}

static NEXT_GENERATED_ID: AtomicU64 = AtomicU64::new(1);

fn assign_missing_ids(item: &mut MenuItem) {
    if item.id.is_empty() && !item.is_separator() {
        let n = NEXT_GENERATED_ID.fetch_add(1, Ordering::Relaxed);
        item.id = format!("auto-{n}");
    }
    if let Some(submenu) = &item.submenu {
        for child in submenu.lock().iter_mut() {
            assign_missing_ids(child);
        }
    }
}

fn collect_ids(item: &MenuItem, ids: &mut Vec<String>) {
    if !item.id.is_empty() {
        ids.push(item.id.clone());
    }
    if let Some(submenu) = &item.submenu {
        for child in submenu.lock().iter() {
            collect_ids(child, ids);
        }
    }
}

fn contains_id(items: &[MenuItem], id: &str) -> bool {
    items.iter().any(|item| {
        item.id == id
            || item
                .submenu
                .as_ref()
                .is_some_and(|submenu| contains_id(&submenu.lock(), id))
    })
}

/// Rejects `item` if it, or anything in its submenu, reuses an id already present in `items` (or
/// within itself).
fn check_unique(items: &[MenuItem], item: &MenuItem) -> Result<(), MenuError> {
    let mut incoming = Vec::new();
    collect_ids(item, &mut incoming);
    for (index, id) in incoming.iter().enumerate() {
        if incoming[..index].contains(id) || contains_id(items, id) {
            return Err(MenuError::DuplicateId(id.clone()));
        }
    }
    Ok(())
}

/// Walks down from `items` looking for `parent_id`.  Gives the item back if the parent was not
/// found.
fn append_under(
    items: &mut [MenuItem],
    parent_id: &str,
    mut item: MenuItem,
) -> Result<Option<MenuItem>, MenuError> {
    for entry in items.iter_mut() {
        if entry.id == parent_id {
            if entry.is_separator() {
                return Err(MenuError::NotASubmenu(parent_id.to_owned()));
            }
            entry.kind = MenuItemKind::Submenu;
            entry.submenu.get_or_insert_with(Menu::new).lock().push(item);
            return Ok(None);
        }
        if let Some(submenu) = &entry.submenu {
            match append_under(&mut submenu.lock(), parent_id, item)? {
                None => return Ok(None),
                Some(returned) => item = returned,
            }
        }
    }
    Ok(Some(item))
}

/// An ordered list of menu items, the top level of which is a menu bar.
///
/// Each `Menu` guards its own items with a mutex, so a menu may be edited from the application
/// thread while a UI thread reads it.  Callbacks passed to [`Menu::walk`] run on a snapshot and
/// never while the lock is held.  Cloning a `Menu` deep-copies the tree.
#[derive(Default)]
pub struct Menu {
    items: Mutex<Vec<MenuItem>>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = MenuItem>) -> Result<Self, MenuError> {
        let menu = Self::new();
        for item in items {
            menu.append(item)?;
        }
        Ok(menu)
    }

    /// Chaining form of [`Menu::append`] for building static menus.  An item whose id is
    /// already taken is dropped with a warning.
    pub fn and_then(self, item: MenuItem) -> Self {
        if let Err(err) = self.append(item) {
            log::warn!("menu item dropped: {err}");
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MenuItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, item: MenuItem) -> Result<(), MenuError> {
        self.insert(usize::MAX, item)
    }

    /// Inserts `item` before position `pos`.  Positions past the end append.
    pub fn insert(&self, pos: usize, mut item: MenuItem) -> Result<(), MenuError> {
        assign_missing_ids(&mut item);
        let mut items = self.lock();
        check_unique(&items, &item)?;
        let pos = pos.min(items.len());
        items.insert(pos, item);
        Ok(())
    }

    /// Appends `item` to the submenu of the item named `parent_id`, anywhere in the tree.  A
    /// leaf parent is turned into a submenu.
    pub fn append_to(&self, parent_id: &str, mut item: MenuItem) -> Result<(), MenuError> {
        assign_missing_ids(&mut item);
        let mut items = self.lock();
        check_unique(&items, &item)?;
        match append_under(&mut items, parent_id, item)? {
            None => Ok(()),
            Some(_) => Err(MenuError::ParentNotFound(parent_id.to_owned())),
        }
    }

    /// Pre-order, depth-first search.  Returns a copy of the first item with this id.
    pub fn find_by_id(&self, id: &str) -> Option<MenuItem> {
        if id.is_empty() {
            return None;
        }
        let items = self.lock();
        for item in items.iter() {
            if item.id == id {
                return Some(item.clone());
            }
            if let Some(found) = item.submenu.as_ref().and_then(|menu| menu.find_by_id(id)) {
                return Some(found);
            }
        }
        None
    }

    /// A snapshot of the top-level items.
    pub fn items(&self) -> Vec<MenuItem> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Visits every item in pre-order together with its depth (0 for the top level).
    pub fn walk<F: FnMut(&MenuItem, usize)>(&self, mut visit: F) {
        self.walk_at(0, &mut visit);
    }

    fn walk_at(&self, depth: usize, visit: &mut dyn FnMut(&MenuItem, usize)) {
        for item in self.items() {
            visit(&item, depth);
            if let Some(submenu) = &item.submenu {
                submenu.walk_at(depth + 1, visit);
            }
        }
    }

    /// Applies `edit` to the first item with this id.  `edit` runs under the menu's lock and must
    /// not touch the menu itself.
    pub fn update<F: FnOnce(&mut MenuItem)>(&self, id: &str, edit: F) -> bool {
        let mut edit = Some(edit);
        self.update_in(id, &mut edit)
    }

    fn update_in<F: FnOnce(&mut MenuItem)>(&self, id: &str, edit: &mut Option<F>) -> bool {
        if id.is_empty() {
            return false;
        }
        let mut items = self.lock();
        for item in items.iter_mut() {
            if item.id == id {
                if let Some(edit) = edit.take() {
                    edit(item);
                }
                return true;
            }
            if let Some(submenu) = &item.submenu {
                if submenu.update_in(id, edit) {
                    return true;
                }
            }
        }
        false
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        self.update(id, |item| item.enabled = enabled)
    }

    /// Checks or unchecks an item.  Checking a radio item unchecks the other radio items of its
    /// group: the unbroken run of radio siblings around it.
    pub fn set_checked(&self, id: &str, checked: bool) -> bool {
        if id.is_empty() {
            return false;
        }
        let mut items = self.lock();
        if let Some(index) = items.iter().position(|item| item.id == id) {
            if checked && items[index].kind == MenuItemKind::Radio {
                let start = items[..index]
                    .iter()
                    .rposition(|item| item.kind != MenuItemKind::Radio)
                    .map_or(0, |p| p + 1);
                let end = items[index..]
                    .iter()
                    .position(|item| item.kind != MenuItemKind::Radio)
                    .map_or(items.len(), |p| index + p);
                for sibling in &mut items[start..end] {
                    sibling.checked = false;
                }
            }
            items[index].checked = checked;
            return true;
        }
        items
            .iter()
            .filter_map(|item| item.submenu.as_ref())
            .any(|submenu| submenu.set_checked(id, checked))
    }
}

impl Clone for Menu {
    fn clone(&self) -> Self {
        Self {
            items: Mutex::new(self.items()),
        }
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lock().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn file_menu() -> Menu {
        Menu::new()
            .and_then(MenuItem::submenu(
                "file",
                "File",
                Menu::new()
                    .and_then(MenuItem::new("new", "New").with_accelerator("Ctrl+N"))
                    .and_then(MenuItem::separator())
                    .and_then(MenuItem::submenu(
                        "recent",
                        "Open Recent",
                        Menu::new().and_then(MenuItem::new("recent-1", "notes.txt")),
                    )),
            ))
            .and_then(MenuItem::submenu("edit", "Edit", Menu::new()))
    }

    #[test]
    fn find_by_id_searches_every_depth() {
        let menu = file_menu();
        assert_eq!(menu.find_by_id("file").map(|i| i.label), Some("File".into()));
        assert_eq!(menu.find_by_id("new").map(|i| i.label), Some("New".into()));
        assert_eq!(
            menu.find_by_id("recent-1").map(|i| i.label),
            Some("notes.txt".into())
        );
        assert!(menu.find_by_id("missing").is_none());
        assert!(menu.find_by_id("").is_none());
    }

    #[test]
    fn find_by_id_prefers_first_preorder_match() {
        let inner = Menu::new().and_then(MenuItem::new("dup", "inner"));
        let menu = Menu::new().and_then(MenuItem::submenu("outer", "Outer", inner));
        // Duplicates can only appear by editing a nested menu directly.
        menu.lock()[0]
            .submenu
            .as_ref()
            .unwrap()
            .lock()
            .push(MenuItem::new("dup", "second"));
        menu.lock().push(MenuItem::new("dup", "top"));
        assert_eq!(menu.find_by_id("dup").unwrap().label, "inner");
    }

    #[test]
    fn insert_clamps_out_of_range_positions() {
        let menu = Menu::new()
            .and_then(MenuItem::new("a", "A"))
            .and_then(MenuItem::new("b", "B"));
        menu.insert(0, MenuItem::new("first", "First")).unwrap();
        menu.insert(99, MenuItem::new("last", "Last")).unwrap();
        menu.insert(2, MenuItem::new("middle", "Middle")).unwrap();
        let ids: Vec<_> = menu.items().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["first", "a", "middle", "b", "last"]);
    }

    #[test]
    fn duplicate_ids_are_rejected_anywhere_in_the_tree() {
        let menu = file_menu();
        assert_eq!(
            menu.append(MenuItem::new("new", "Another New")),
            Err(MenuError::DuplicateId("new".into()))
        );
        let clashing = MenuItem::submenu(
            "tools",
            "Tools",
            Menu::new().and_then(MenuItem::new("recent-1", "x")),
        );
        assert_eq!(
            menu.append(clashing),
            Err(MenuError::DuplicateId("recent-1".into()))
        );
        assert!(menu.find_by_id("tools").is_none());
    }

    #[test]
    fn separators_and_empty_ids_are_exempt() {
        let menu = Menu::new()
            .and_then(MenuItem::separator())
            .and_then(MenuItem::separator())
            .and_then(MenuItem::new("", "Anonymous"))
            .and_then(MenuItem::new("", "Anonymous"));
        let items = menu.items();
        assert_eq!(items.len(), 4);
        assert!(items[0].id.is_empty());
        assert!(items[2].id.starts_with("auto-"));
        assert_ne!(items[2].id, items[3].id);
    }

    #[test]
    fn append_to_nests_under_parent() {
        let menu = file_menu();
        menu.append_to("edit", MenuItem::new("undo", "Undo")).unwrap();
        menu.append_to("new", MenuItem::new("new-window", "Window"))
            .unwrap();
        assert_eq!(menu.find_by_id("undo").unwrap().label, "Undo");
        assert!(menu.find_by_id("new").unwrap().is_submenu());
        assert_eq!(
            menu.append_to("nowhere", MenuItem::new("x", "X")),
            Err(MenuError::ParentNotFound("nowhere".into()))
        );
        assert_eq!(
            menu.append_to("edit", MenuItem::new("undo", "Undo again")),
            Err(MenuError::DuplicateId("undo".into()))
        );
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let mut seen = Vec::new();
        file_menu().walk(|item, depth| seen.push((item.id.clone(), depth)));
        let expected = [
            ("file", 0),
            ("new", 1),
            ("", 1),
            ("recent", 1),
            ("recent-1", 2),
            ("edit", 0),
        ];
        assert_eq!(
            seen,
            expected.map(|(id, depth)| (id.to_owned(), depth)).to_vec()
        );
    }

    #[test]
    fn walk_callback_may_edit_the_menu() {
        let menu = file_menu();
        menu.walk(|item, _| {
            if item.id == "new" {
                menu.set_enabled("new", false);
            }
        });
        assert!(!menu.find_by_id("new").unwrap().enabled);
    }

    #[test]
    fn radio_groups_are_exclusive() {
        let menu = Menu::new()
            .and_then(MenuItem::radio("small", "Small", true))
            .and_then(MenuItem::radio("large", "Large", false))
            .and_then(MenuItem::separator())
            .and_then(MenuItem::radio("light", "Light", true))
            .and_then(MenuItem::checkbox("grid", "Show Grid", true));
        assert!(menu.set_checked("large", true));
        let checked: Vec<_> = menu
            .items()
            .into_iter()
            .filter(|i| i.checked)
            .map(|i| i.id)
            .collect();
        assert_eq!(checked, ["large", "light", "grid"]);
        assert!(menu.set_checked("grid", false));
        assert!(!menu.set_checked("missing", true));
    }

    #[test]
    fn clone_is_deep() {
        let menu = file_menu();
        let copy = menu.clone();
        menu.set_enabled("recent-1", false);
        assert!(copy.find_by_id("recent-1").unwrap().enabled);
    }

    #[test]
    fn actions_share_their_closure() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let item = MenuItem::new("ping", "Ping").on_click(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let copy = item.clone();
        item.action.unwrap().call();
        copy.action.unwrap().call();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shared_between_threads() {
        let menu = Menu::new().and_then(MenuItem::checkbox("grid", "Grid", false));
        let registry = crate::CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = {
            let count = count.clone();
            registry.register(Some(Action::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })))
        };

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for n in 0..100 {
                    menu.append(MenuItem::new(format!("item-{n}"), "Item")).unwrap();
                }
            });
            scope.spawn(|| {
                for n in 0..100 {
                    menu.set_checked("grid", n % 2 == 0);
                    assert!(menu.find_by_id("grid").is_some());
                }
            });
            scope.spawn(|| {
                for _ in 0..100 {
                    assert!(registry.dispatch(id));
                }
            });
        });

        assert_eq!(menu.len(), 101);
        assert!(menu.find_by_id("item-99").is_some());
        assert!(!menu.find_by_id("grid").unwrap().checked);
        assert_eq!(count.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn unparseable_accelerators_are_ignored() {
        let item = MenuItem::new("x", "X").with_accelerator("Hyper+X");
        assert!(item.parsed_accelerator().is_none());
        let item = MenuItem::new("y", "Y").with_accelerator("ctrl+shift+y");
        assert_eq!(
            item.parsed_accelerator().map(|a| a.to_string()).as_deref(),
            Some("Ctrl+Shift+Y")
        );
    }
}

// End of File
