// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Menu construction for each native toolkit.
//!
//! Every backend is a depth-first walk over the [`Menu`](crate::Menu) written against a small
//! toolkit trait, so the same code drives the real toolkit (see `platform_impl`) and the
//! recording toolkits used in tests on any host.

pub mod cocoa;
pub mod gtk;
pub mod win32;

// End of File
