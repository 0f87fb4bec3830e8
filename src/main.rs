// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

fn main() {
    let config_path = std::env::args().nth(1);

    if let Err(err) = velo::start(config_path.as_deref()) {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("because: {cause}");
        }
        std::process::exit(1);
    }
}

// End of File
