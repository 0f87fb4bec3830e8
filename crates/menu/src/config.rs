// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

/// Which backend the controller should try first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendPreference {
    /// The native installer for this platform, falling back to the scripted menu.
    #[default]
    Auto,
    /// Always render the scripted menu.
    Fallback,
}

impl FromStr for BackendPreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "native" => Ok(BackendPreference::Auto),
            "fallback" | "script" | "js" => Ok(BackendPreference::Fallback),
            other => bail!("unknown menu backend {other:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FallbackConfig {
    /// DOM id of the injected menu bar.
    pub element_id: String,
    /// Whether the scripted menu listens for accelerator chords.
    pub keyboard_shortcuts: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            element_id: "velo-native-menu".to_owned(),
            keyboard_shortcuts: true,
        }
    }
}

/// Settings for a [`MenuController`](crate::MenuController).  Every field has a default, so a
/// configuration file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuConfig {
    pub app_name: String,
    pub backend: BackendPreference,
    pub fallback: FallbackConfig,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            app_name: "Velo App".to_owned(),
            backend: BackendPreference::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl MenuConfig {
    pub const BACKEND_VAR: &'static str = "VELO_MENU_BACKEND";
    pub const APP_NAME_VAR: &'static str = "VELO_MENU_APP_NAME";

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid menu configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading menu configuration from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Defaults overridden by `VELO_MENU_BACKEND` and `VELO_MENU_APP_NAME`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().with_overrides(lookup)
    }

    /// Applies environment-style overrides on top of `self`.  An unrecognized backend name is
    /// logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(Self::BACKEND_VAR) {
            match value.parse() {
                Ok(backend) => self.backend = backend,
                Err(err) => log::warn!("{}: {err}", Self::BACKEND_VAR),
            }
        }
        if let Some(name) = lookup(Self::APP_NAME_VAR).filter(|name| !name.is_empty()) {
            self.app_name = name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MenuConfig::from_json(
            r#"{ "appName": "Demo", "fallback": { "keyboardShortcuts": false } }"#,
        )
        .unwrap();
        assert_eq!(config.app_name, "Demo");
        assert_eq!(config.backend, BackendPreference::Auto);
        assert_eq!(config.fallback.element_id, "velo-native-menu");
        assert!(!config.fallback.keyboard_shortcuts);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = MenuConfig::from_json(r#"{ "backend": "carrier-pigeon" }"#).unwrap_err();
        assert!(err.to_string().contains("invalid menu configuration"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = MenuConfig::from_file("/nonexistent/velo/menu.json").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/velo/menu.json"));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars = HashMap::from([
            (MenuConfig::BACKEND_VAR, "Fallback"),
            (MenuConfig::APP_NAME_VAR, "Notes"),
        ]);
        let config = MenuConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.backend, BackendPreference::Fallback);
        assert_eq!(config.app_name, "Notes");
    }

    #[test]
    fn bad_backend_override_is_ignored() {
        let config = MenuConfig {
            backend: BackendPreference::Fallback,
            ..MenuConfig::default()
        }
        .with_overrides(|name| (name == MenuConfig::BACKEND_VAR).then(|| "gopher".to_owned()));
        assert_eq!(config.backend, BackendPreference::Fallback);
    }
}

// End of File
