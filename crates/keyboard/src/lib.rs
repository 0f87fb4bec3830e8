// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! # velo's Keyboard Vocabulary
//!
//! Platform-neutral description of keyboard shortcuts.  Menus describe their accelerators as
//! chord strings such as `"Ctrl+Shift+I"` or `"Command+Q"`; this crate parses those strings into
//! an [`Accelerator`] (a set of [`ModifierKeys`] plus a single [`Key`]) which each menu backend
//! then translates into its own native representation.

mod accelerator;
pub use accelerator::{Accelerator, AcceleratorError, Key, NamedKey};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierKeys: u8 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 1;
        const OPTION  = 1 << 2;
        const COMMAND = 1 << 3;
    }
}

impl ModifierKeys {
    /// The modifiers which may appear in a chord string, in the order in which they are written
    /// when a chord is normalized.
    pub const CHORD_ORDER: [(ModifierKeys, &'static str); 4] = [
        (ModifierKeys::CONTROL, "Ctrl"),
        (ModifierKeys::OPTION, "Alt"),
        (ModifierKeys::SHIFT, "Shift"),
        (ModifierKeys::COMMAND, "Command"),
    ];
}

/// Most commonly used types, suitable for glob import.
pub mod prelude {
    pub use crate::{Accelerator, Key, ModifierKeys, NamedKey};
}


// End of File
