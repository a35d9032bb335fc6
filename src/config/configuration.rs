//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::BTreeSet;
use std::ops::Deref;

use getset::Getters;

use crate::config::NotValidatedConfiguration;

#[derive(Debug, Getters)]
pub struct Configuration {
    pub(in crate::config) inner: NotValidatedConfiguration,

    #[getset(get = "pub")]
    pub(in crate::config) linter_minimum_version: semver::Version,

    #[getset(get = "pub")]
    pub(in crate::config) apidoc_minimum_version: semver::Version,
}

impl Deref for Configuration {
    type Target = NotValidatedConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Configuration {
    /// The reviewer candidates for a project
    pub fn reviewers_for(&self, project: &str) -> BTreeSet<String> {
        self.project_reviewers()
            .get(project)
            .unwrap_or_else(|| self.default_reviewers())
            .iter()
            .cloned()
            .collect()
    }

    pub fn is_documentation_project(&self, project: &str) -> bool {
        self.documentation_projects().iter().any(|p| p == project)
    }

    pub fn project_git_url(&self, project: &str) -> String {
        format!(
            "{}/{}/{}.git",
            self.github_url().as_str().trim_end_matches('/'),
            self.organization(),
            project
        )
    }
}
