//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use getset::CopyGetters;
use getset::Getters;
use typed_builder::TypedBuilder;

use crate::remote::GitHubOrigin;
use crate::review::ReviewCommand;

pub const DEFAULT_DIFFBASE: &str = "upstream/master";

/// What the user asked for on the command line
#[derive(Clone, Debug, Getters, CopyGetters, TypedBuilder)]
pub struct ReviewOptions {
    #[getset(get_copy = "pub")]
    command: ReviewCommand,

    /// Branch to close or open
    #[getset(get = "pub")]
    #[builder(default)]
    feature_branch: Option<String>,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    issue_number: Option<u64>,

    /// Fork branch to merge
    #[getset(get = "pub")]
    #[builder(default)]
    fork: Option<GitHubOrigin>,

    #[getset(get = "pub")]
    #[builder(default = String::from(DEFAULT_DIFFBASE))]
    diffbase: String,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    all_files: bool,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    no_browser: bool,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    no_confirm: bool,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    offline: bool,
}

impl ReviewOptions {
    /// Base to lint against, `None` to lint all files
    pub fn lint_diffbase(&self) -> Option<&str> {
        if self.all_files {
            None
        } else if self.command == ReviewCommand::Merge {
            Some("origin/master")
        } else {
            Some(&self.diffbase)
        }
    }
}
