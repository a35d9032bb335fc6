//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Result;
use tracing::debug;

use crate::tool::lenient_version;
use crate::util::executor::Executor;

/// Regenerates the API documentation of a project with sphinx-apidoc
pub struct SphinxApiDocHelper {
    program: String,
    project: String,
    output_dir: String,
    minimum_version: semver::Version,
    executor: Arc<dyn Executor>,
}

/// Output looks like "Sphinx (sphinx-apidoc) 1.2.3" or "sphinx-apidoc 4.5.0"
pub fn parse_apidoc_version(output: &str) -> Option<semver::Version> {
    output
        .lines()
        .filter(|line| line.contains("sphinx-apidoc"))
        .filter_map(|line| line.split_whitespace().last())
        .find_map(lenient_version)
}

impl SphinxApiDocHelper {
    pub fn new(
        program: String,
        project: String,
        output_dir: String,
        minimum_version: semver::Version,
        executor: Arc<dyn Executor>,
    ) -> Self {
        SphinxApiDocHelper {
            program,
            project,
            output_dir,
            minimum_version,
            executor,
        }
    }

    pub fn minimum_version(&self) -> &semver::Version {
        &self.minimum_version
    }

    /// Old sphinx-apidoc releases do not know `--version`, which counts as outdated
    pub async fn check_up_to_date_version(&self) -> Result<bool> {
        let out = self.executor.output(&self.program, &["--version"]).await?;
        if !out.success() {
            return Ok(false);
        }

        let version = parse_apidoc_version(&out.stdout);
        debug!("Found sphinx-apidoc version: {:?}", version);
        Ok(version.map(|v| v >= self.minimum_version).unwrap_or(false))
    }

    pub async fn update_api_docs(&self) -> Result<()> {
        let out = self
            .executor
            .output(
                &self.program,
                &["-f", "-o", self.output_dir.as_str(), self.project.as_str()],
            )
            .await?;

        if !out.success() {
            return Err(anyhow!(
                "{} failed with exit code {}: {}",
                self.program,
                out.code,
                out.stderr.trim()
            ));
        }

        Ok(())
    }
}
