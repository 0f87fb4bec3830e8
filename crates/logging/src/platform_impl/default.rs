// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! No environment to read a configuration from, so only the maximum level is set.

pub(crate) fn try_init_with_level(
    crates: &[&'static str],
    log_level: log::LevelFilter,
) -> Result<(), log::SetLoggerError> {
    let _ = crates;
    log::set_max_level(log_level);
    Ok(())
}

// End of File
