//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Wrappers around the external development tools of a project

mod pylint;
pub use pylint::*;

mod sphinx;
pub use sphinx::*;

/// Parse a tool version like "1.5", "1.5.0" or "2.17.4-dev1" into a semver version
///
/// Missing minor and patch numbers default to zero, anything after the numeric part of a
/// component is ignored.
pub fn lenient_version(s: &str) -> Option<semver::Version> {
    let mut numbers = s.trim().splitn(3, '.').map(|part| {
        let digits = part
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>();
        digits.parse::<u64>().ok()
    });

    let major = numbers.next().flatten()?;
    let minor = numbers.next().flatten().unwrap_or(0);
    let patch = numbers.next().flatten().unwrap_or(0);
    Some(semver::Version::new(major, minor, patch))
}
