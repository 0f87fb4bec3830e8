// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use crate::ModifierKeys;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Reasons a chord string could not be understood.  Menu backends treat every one of these as
/// "no accelerator" rather than as a failure of the menu as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AcceleratorError {
    #[error("accelerator string is empty")]
    Empty,
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
    #[error("accelerator {0:?} names no key")]
    MissingKey(String),
}

/// Non-printing keys with a stable name in chord strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
}

impl NamedKey {
    pub fn name(self) -> &'static str {
        match self {
            NamedKey::Backspace => "Backspace",
            NamedKey::Delete => "Delete",
            NamedKey::Enter => "Enter",
            NamedKey::Tab => "Tab",
            NamedKey::Escape => "Escape",
            NamedKey::Space => "Space",
            NamedKey::Up => "Up",
            NamedKey::Down => "Down",
            NamedKey::Left => "Left",
            NamedKey::Right => "Right",
            NamedKey::Home => "Home",
            NamedKey::End => "End",
            NamedKey::PageUp => "PageUp",
            NamedKey::PageDown => "PageDown",
            NamedKey::Insert => "Insert",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "backspace" => NamedKey::Backspace,
            "delete" | "del" => NamedKey::Delete,
            "enter" | "return" => NamedKey::Enter,
            "tab" => NamedKey::Tab,
            "escape" | "esc" => NamedKey::Escape,
            "space" => NamedKey::Space,
            "up" | "arrowup" => NamedKey::Up,
            "down" | "arrowdown" => NamedKey::Down,
            "left" | "arrowleft" => NamedKey::Left,
            "right" | "arrowright" => NamedKey::Right,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            "pageup" => NamedKey::PageUp,
            "pagedown" => NamedKey::PageDown,
            "insert" => NamedKey::Insert,
            _ => return None,
        })
    }
}

/// The non-modifier part of a chord.  Letters are stored upper-case, so that `"ctrl+n"` and
/// `"Ctrl+N"` describe the same accelerator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// F1 through F24.
    Function(u8),
    Named(NamedKey),
}

impl Key {
    fn parse(token: &str) -> Result<Self, AcceleratorError> {
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return if c.is_ascii_alphabetic() {
                Ok(Key::Char(c.to_ascii_uppercase()))
            } else if c.is_ascii_graphic() {
                Ok(Key::Char(c))
            } else {
                Err(AcceleratorError::UnknownKey(token.to_owned()))
            };
        }

        let function = token
            .strip_prefix('F')
            .or_else(|| token.strip_prefix('f'))
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=24).contains(n));
        if let Some(n) = function {
            return Ok(Key::Function(n));
        }

        if token.eq_ignore_ascii_case("plus") {
            return Ok(Key::Char('+'));
        }

        NamedKey::from_name(token)
            .map(Key::Named)
            .ok_or_else(|| AcceleratorError::UnknownKey(token.to_owned()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Function(n) => write!(f, "F{n}"),
            Key::Named(named) => f.write_str(named.name()),
        }
    }
}

/// A keyboard shortcut: zero or more modifier keys held while a single key is pressed.
///
/// Parsed from the `[Modifier+]*Key` chord notation.  Modifier names are case-insensitive and
/// accept the usual aliases (`Control`, `Option`, `Cmd`, `Super`, `Meta`), and `CmdOrCtrl`
/// resolves to Command on macOS and Control everywhere else.  The [`Display`](fmt::Display)
/// form is normalized: modifiers always appear in the order Ctrl, Alt, Shift, Command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Accelerator {
    pub modifiers: ModifierKeys,
    pub key: Key,
}

impl Accelerator {
    pub fn new(modifiers: ModifierKeys, key: Key) -> Self {
        Self { modifiers, key }
    }

    pub fn parse(chord: &str) -> Result<Self, AcceleratorError> {
        let chord = chord.trim();
        if chord.is_empty() {
            return Err(AcceleratorError::Empty);
        }

        // A literal plus key is written "Ctrl++".
        let (modifier_part, key_token) = match chord.strip_suffix("++") {
            Some(rest) => (Some(rest), "+"),
            None if chord == "+" => (None, "+"),
            None => match chord.rsplit_once('+') {
                Some((rest, key)) => (Some(rest), key),
                None => (None, chord),
            },
        };

        let key_token = key_token.trim();
        if key_token.is_empty() {
            return Err(AcceleratorError::MissingKey(chord.to_owned()));
        }

        let mut modifiers = ModifierKeys::empty();
        for token in modifier_part.into_iter().flat_map(|part| part.split('+')) {
            modifiers |= parse_modifier(token.trim())?;
        }

        Ok(Self {
            modifiers,
            key: Key::parse(key_token)?,
        })
    }

    /// Parses and re-renders a chord in normalized form, or `None` if it is not understood.
    pub fn normalize(chord: &str) -> Option<String> {
        Self::parse(chord).ok().map(|accelerator| accelerator.to_string())
    }
}

fn parse_modifier(token: &str) -> Result<ModifierKeys, AcceleratorError> {
    Ok(match token.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => ModifierKeys::CONTROL,
        "alt" | "option" | "opt" => ModifierKeys::OPTION,
        "shift" => ModifierKeys::SHIFT,
        "command" | "cmd" | "super" | "meta" => ModifierKeys::COMMAND,
        "cmdorctrl" | "commandorcontrol" => {
            if cfg!(target_os = "macos") {
                ModifierKeys::COMMAND
            } else {
                ModifierKeys::CONTROL
            }
        }
        _ => return Err(AcceleratorError::UnknownModifier(token.to_owned())),
    })
}

impl FromStr for Accelerator {
    type Err = AcceleratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (modifier, name) in ModifierKeys::CHORD_ORDER {
            if self.modifiers.contains(modifier) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.key)
    }
}


// End of File
