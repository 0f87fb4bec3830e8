// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use crate::{
    BackendPreference, CallbackRegistry, ContentBridge, ControllerError, FallbackError,
    FallbackRenderer, InstallError, Menu, MenuConfig, MenuItemKind, Platform, PlatformInstaller,
    WindowSource, native_installer,
};
use serde::Serialize;
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Which path ended up drawing the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Backend {
    Native(Platform),
    Fallback,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Native(platform) => write!(f, "native {platform} menu"),
            Backend::Fallback => f.write_str("scripted menu"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstallState {
    #[default]
    Uninstalled,
    Installed(Backend),
    /// Both paths failed.  `install` may be called again.
    Failed,
}

struct Inner {
    state: InstallState,
    installer: Box<dyn PlatformInstaller>,
    fallback: Option<FallbackRenderer>,
}

/// Owns a menu and puts it on screen, natively when possible and as a scripted menu bar
/// otherwise.
///
/// ```no_run
/// use velo_menu::{Menu, MenuConfig, MenuController, MenuItem, NativeWindow};
///
/// # fn window() -> Option<NativeWindow> { None }
/// let menu = Menu::new().and_then(MenuItem::new("new", "New").on_click(|| println!("new")));
/// let controller = MenuController::new(menu, MenuConfig::default());
/// controller.install(&window()).ok();
/// ```
pub struct MenuController {
    menu: Menu,
    config: MenuConfig,
    registry: Arc<CallbackRegistry>,
    inner: Mutex<Inner>,
}

impl MenuController {
    pub fn new(menu: Menu, config: MenuConfig) -> Self {
        Self::with_parts(menu, config, native_installer())
    }

    fn with_parts(menu: Menu, config: MenuConfig, installer: Box<dyn PlatformInstaller>) -> Self {
        let registry = Arc::new(CallbackRegistry::with_base(installer.platform().id_base()));
        Self {
            menu,
            config,
            registry,
            inner: Mutex::new(Inner {
                state: InstallState::Uninstalled,
                installer,
                fallback: None,
            }),
        }
    }

    /// Gives the controller a page to draw the scripted menu into.
    pub fn with_bridge(self, bridge: Arc<dyn ContentBridge>) -> Self {
        let renderer = FallbackRenderer::new(bridge, self.config.fallback.clone());
        self.lock().fallback = Some(renderer);
        self
    }

    /// Replaces the platform's installer.  The registry is recreated to match the installer's
    /// id range.
    pub fn with_installer(self, installer: Box<dyn PlatformInstaller>) -> Self {
        let Self {
            menu,
            config,
            inner,
            ..
        } = self;
        let fallback = inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .fallback;
        let controller = Self::with_parts(menu, config, installer);
        controller.lock().fallback = fallback;
        controller
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn state(&self) -> InstallState {
        self.lock().state
    }

    /// Installs the menu once.  Later calls return the backend of the first successful install
    /// without touching the window again.
    ///
    /// A native failure is logged and the scripted menu is tried instead; an error is returned
    /// only when both fail, and the controller is left in [`InstallState::Failed`].
    pub fn install(&self, window: &dyn WindowSource) -> Result<Backend, ControllerError> {
        let mut inner = self.lock();
        if let InstallState::Installed(backend) = inner.state {
            log::debug!("menu already installed as {backend}");
            return Ok(backend);
        }
        self.install_locked(&mut inner, window)
    }

    /// Builds and installs the menu again, replacing what is on screen.  Actions keep working
    /// through the same registry.
    pub fn reinstall(&self, window: &dyn WindowSource) -> Result<Backend, ControllerError> {
        let mut inner = self.lock();
        self.install_locked(&mut inner, window)
    }

    fn install_locked(
        &self,
        inner: &mut Inner,
        window: &dyn WindowSource,
    ) -> Result<Backend, ControllerError> {
        match self.attempt(inner, window) {
            Ok(backend) => {
                log::info!("installed {backend}");
                inner.state = InstallState::Installed(backend);
                Ok(backend)
            }
            Err(err) => {
                log::error!("{err}");
                inner.state = InstallState::Failed;
                Err(err)
            }
        }
    }

    fn attempt(
        &self,
        inner: &mut Inner,
        window: &dyn WindowSource,
    ) -> Result<Backend, ControllerError> {
        let native = match self.install_native(inner, window) {
            Ok(platform) => {
                if inner.state == InstallState::Installed(Backend::Fallback) {
                    Self::remove_fallback(inner);
                }
                return Ok(Backend::Native(platform));
            }
            Err(err) => err,
        };
        log::warn!("native menu unavailable ({native}), using the scripted menu");

        let Some(renderer) = inner.fallback.as_mut() else {
            return Err(ControllerError::Install {
                native,
                fallback: FallbackError::NoBridge,
            });
        };
        match renderer.render(&self.menu, &self.registry) {
            Ok(()) => Ok(Backend::Fallback),
            Err(fallback) => Err(ControllerError::Install { native, fallback }),
        }
    }

    /// Only one menu may be live, so the scripted one goes once the native one is up.
    fn remove_fallback(inner: &mut Inner) {
        let Some(renderer) = inner.fallback.as_mut() else {
            return;
        };
        if let Err(err) = renderer.remove() {
            log::warn!("could not remove the scripted menu: {err}");
        }
    }

    fn install_native(
        &self,
        inner: &mut Inner,
        window: &dyn WindowSource,
    ) -> Result<Platform, InstallError> {
        if self.config.backend == BackendPreference::Fallback {
            return Err(InstallError::Disabled);
        }
        let window = window.native_window().map_err(|err| {
            log::debug!("{err}");
            InstallError::NoWindowHandle
        })?;
        inner.installer.install(&self.menu, &window, &self.registry)?;
        Ok(inner.installer.platform())
    }

    /// Enables or disables an item.  The scripted menu shows the change at once; native menus
    /// pick it up on the next [`reinstall`](Self::reinstall).
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let inner = self.lock();
        if !self.menu.set_enabled(id, enabled) {
            return false;
        }
        self.push_state(&inner, id);
        true
    }

    /// Checks or unchecks an item, unchecking the rest of its radio group when needed.
    pub fn set_checked(&self, id: &str, checked: bool) -> bool {
        let inner = self.lock();
        if !self.menu.set_checked(id, checked) {
            return false;
        }
        let is_radio = self
            .menu
            .find_by_id(id)
            .is_some_and(|item| item.kind == MenuItemKind::Radio);
        if is_radio {
            let mut radios = Vec::new();
            self.menu.walk(|item, _| {
                if item.kind == MenuItemKind::Radio {
                    radios.push(item.id.clone());
                }
            });
            for radio in radios {
                self.push_state(&inner, &radio);
            }
        } else {
            self.push_state(&inner, id);
        }
        true
    }

    fn push_state(&self, inner: &Inner, id: &str) {
        if inner.state != InstallState::Installed(Backend::Fallback) {
            return;
        }
        let (Some(renderer), Some(item)) = (inner.fallback.as_ref(), self.menu.find_by_id(id))
        else {
            return;
        };
        if let Err(err) = renderer.update_item(id, item.enabled, item.checked) {
            log::warn!("could not update scripted menu item {id:?}: {err}");
        }
    }
}


// End of File
