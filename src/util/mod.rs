//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

pub mod executor;
pub mod git;
pub mod netrc;

pub fn stdout_is_pipe() -> bool {
    !atty::is(atty::Stream::Stdout)
}

/// Title-case a command name for messages: "merge-edit" becomes "Merge-edit"
pub fn title(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(title("create"), "Create");
        assert_eq!(title("merge-edit"), "Merge-edit");
        assert_eq!(title(""), "");
    }
}
