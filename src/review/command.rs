//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use std::str::FromStr;

use anyhow::anyhow;
use anyhow::Result;

/// The commands of the review tool
///
/// Displayed in kebab case. Parsing also accepts the snake case aliases.
#[derive(parse_display::Display, Clone, Copy, Debug, Eq, PartialEq)]
#[display(style = "kebab-case")]
pub enum ReviewCommand {
    Close,
    Create,
    Lint,
    LintTest,
    Merge,
    MergeEdit,
    Open,
    Test,
    Update,
    UpdateAuthors,
    UpdateVersion,
}

impl FromStr for ReviewCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.replace('_', "-").as_str() {
            "close" => Ok(ReviewCommand::Close),
            "create" => Ok(ReviewCommand::Create),
            "lint" => Ok(ReviewCommand::Lint),
            "lint-test" => Ok(ReviewCommand::LintTest),
            "merge" => Ok(ReviewCommand::Merge),
            "merge-edit" => Ok(ReviewCommand::MergeEdit),
            "open" => Ok(ReviewCommand::Open),
            "test" => Ok(ReviewCommand::Test),
            "update" => Ok(ReviewCommand::Update),
            "update-authors" => Ok(ReviewCommand::UpdateAuthors),
            "update-version" => Ok(ReviewCommand::UpdateVersion),
            other => Err(anyhow!("Unsupported command: {}", other)),
        }
    }
}

impl ReviewCommand {
    /// Capitalized name, as used in abort messages
    pub fn title(&self) -> String {
        crate::util::title(&self.to_string())
    }

    pub fn allowed_offline(&self) -> bool {
        matches!(
            self,
            ReviewCommand::Lint | ReviewCommand::LintTest | ReviewCommand::Test
        )
    }

    pub fn uses_codereview(&self) -> bool {
        matches!(
            self,
            ReviewCommand::Close
                | ReviewCommand::Create
                | ReviewCommand::Merge
                | ReviewCommand::Update
        )
    }

    pub fn requires_upstream(&self) -> bool {
        matches!(
            self,
            ReviewCommand::Close
                | ReviewCommand::Create
                | ReviewCommand::Lint
                | ReviewCommand::LintTest
                | ReviewCommand::Update
        )
    }

    pub fn requires_origin(&self) -> bool {
        matches!(self, ReviewCommand::Merge)
    }

    pub fn requires_clean_worktree(&self) -> bool {
        !matches!(
            self,
            ReviewCommand::Lint
                | ReviewCommand::LintTest
                | ReviewCommand::Test
                | ReviewCommand::UpdateVersion
        )
    }

    pub fn runs_linter(&self) -> bool {
        matches!(
            self,
            ReviewCommand::Create
                | ReviewCommand::Merge
                | ReviewCommand::Lint
                | ReviewCommand::LintTest
                | ReviewCommand::Update
        )
    }

    pub fn runs_tests(&self) -> bool {
        matches!(
            self,
            ReviewCommand::Create
                | ReviewCommand::LintTest
                | ReviewCommand::Merge
                | ReviewCommand::Test
                | ReviewCommand::Update
        )
    }

    pub fn pulls_from_fork(&self) -> bool {
        matches!(self, ReviewCommand::Merge | ReviewCommand::MergeEdit)
    }

    /// Commands that need access tokens from the `.netrc`
    pub fn uses_credentials(&self) -> bool {
        matches!(
            self,
            ReviewCommand::Close | ReviewCommand::Create | ReviewCommand::Merge
        )
    }
}
