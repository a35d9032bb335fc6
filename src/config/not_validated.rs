//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::BTreeMap;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use serde::Deserialize;
use url::Url;

use crate::config::util::*;
use crate::config::Configuration;

#[derive(Debug, Getters, Deserialize)]
pub struct NotValidatedConfiguration {
    /// The GitHub organization hosting the projects
    #[serde(default = "default_organization")]
    #[getset(get = "pub")]
    organization: String,

    /// Projects the tool may be run in
    #[serde(default = "default_supported_projects")]
    #[getset(get = "pub")]
    supported_projects: Vec<String>,

    /// Projects that only hold documentation: no linting, tests, version or authors updates
    #[serde(default = "default_documentation_projects")]
    #[getset(get = "pub")]
    documentation_projects: Vec<String>,

    #[serde(default = "default_github_url")]
    #[getset(get = "pub")]
    github_url: Url,

    #[serde(default = "default_github_api_url")]
    #[getset(get = "pub")]
    github_api_url: Url,

    #[serde(default = "default_codereview_url")]
    #[getset(get = "pub")]
    codereview_url: Url,

    #[serde(default = "default_readthedocs_url")]
    #[getset(get = "pub")]
    readthedocs_url: Url,

    /// Command line of the codereview upload tool, without arguments
    #[serde(default = "default_upload_tool")]
    #[getset(get = "pub")]
    upload_tool: Vec<String>,

    /// Command line of the external test runner
    #[serde(default = "default_test_command")]
    #[getset(get = "pub")]
    test_command: Vec<String>,

    #[serde(default = "default_linter")]
    #[getset(get = "pub")]
    linter: String,

    #[serde(default = "default_linter_rcfile")]
    #[getset(get = "pub")]
    linter_rcfile: String,

    #[serde(default = "default_linter_minimum_version")]
    linter_minimum_version: String,

    #[serde(default = "default_apidoc")]
    #[getset(get = "pub")]
    apidoc: String,

    #[serde(default = "default_apidoc_minimum_version")]
    apidoc_minimum_version: String,

    #[serde(default = "default_apidoc_output_dir")]
    #[getset(get = "pub")]
    apidoc_output_dir: String,

    #[serde(default = "default_changelog_maintainer")]
    #[getset(get = "pub")]
    changelog_maintainer: String,

    #[serde(default = "default_changelog_distribution")]
    #[getset(get = "pub")]
    changelog_distribution: String,

    #[serde(default = "default_changelog_urgency")]
    #[getset(get = "pub")]
    changelog_urgency: String,

    /// Reviewers per project, projects not listed use `default_reviewers`
    #[serde(default = "default_project_reviewers")]
    #[getset(get = "pub")]
    project_reviewers: BTreeMap<String, Vec<String>>,

    #[serde(default = "default_reviewers")]
    #[getset(get = "pub")]
    default_reviewers: Vec<String>,

    /// Addresses that are always put on CC
    #[serde(default = "default_cc_reviewers")]
    #[getset(get = "pub")]
    cc_reviewers: Vec<String>,
}

impl NotValidatedConfiguration {
    pub fn validate(self) -> Result<Configuration> {
        if self.organization.trim().is_empty() {
            return Err(anyhow!("Organization must not be empty"));
        }

        if self.supported_projects.is_empty() {
            return Err(anyhow!("No supported projects configured"));
        }

        if self.test_command.is_empty() {
            return Err(anyhow!("Test command must not be empty"));
        }

        if self.upload_tool.is_empty() {
            return Err(anyhow!("Upload tool command must not be empty"));
        }

        for (name, url) in [
            ("github_url", &self.github_url),
            ("github_api_url", &self.github_api_url),
            ("codereview_url", &self.codereview_url),
            ("readthedocs_url", &self.readthedocs_url),
        ] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("Not a http(s) URL: {} = {}", name, url));
            }
        }

        if self.default_reviewers.is_empty() {
            return Err(anyhow!("No default reviewers configured"));
        }

        if let Some((project, _)) = self.project_reviewers.iter().find(|(_, r)| r.is_empty()) {
            return Err(anyhow!("No reviewers configured for project {}", project));
        }

        let linter_minimum_version = semver::Version::parse(&self.linter_minimum_version)
            .context("Parsing 'linter_minimum_version' as semver::Version")?;
        let apidoc_minimum_version = semver::Version::parse(&self.apidoc_minimum_version)
            .context("Parsing 'apidoc_minimum_version' as semver::Version")?;

        Ok(Configuration {
            inner: self,
            linter_minimum_version,
            apidoc_minimum_version,
        })
    }
}
