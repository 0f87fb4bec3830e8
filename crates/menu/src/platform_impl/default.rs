// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Platforms without a native menu bar we know how to build (including Linux without the `gtk`
//! feature).  Installation always fails, which sends the controller to the scripted fallback.

use crate::{PlatformInstaller, UnsupportedInstaller};

pub(crate) fn native_installer() -> Box<dyn PlatformInstaller> {
    Box::new(UnsupportedInstaller)
}

// End of File
