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

use anyhow::Result;
use tracing::{debug, trace};

use crate::tool::lenient_version;
use crate::util::executor::Executor;

pub struct PylintHelper {
    program: String,
    rcfile: String,
    minimum_version: semver::Version,
    executor: Arc<dyn Executor>,
}

/// Find the version in the output of `pylint --version`
///
/// The relevant line looks like "pylint 1.5.4," or "pylint 2.17.4".
pub fn parse_pylint_version(output: &str) -> Option<semver::Version> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("pylint "))
        .filter_map(|rest| lenient_version(rest.split(',').next().unwrap_or(rest)))
        .last()
}

impl PylintHelper {
    pub fn new(
        program: String,
        rcfile: String,
        minimum_version: semver::Version,
        executor: Arc<dyn Executor>,
    ) -> Self {
        PylintHelper {
            program,
            rcfile,
            minimum_version,
            executor,
        }
    }

    pub fn minimum_version(&self) -> &semver::Version {
        &self.minimum_version
    }

    pub async fn check_up_to_date_version(&self) -> Result<bool> {
        let out = self.executor.output(&self.program, &["--version"]).await?;
        if !out.success() {
            return Ok(false);
        }

        let version = parse_pylint_version(&out.stdout);
        debug!("Found pylint version: {:?}", version);
        Ok(version
            .map(|v| v >= self.minimum_version)
            .unwrap_or(false))
    }

    /// Lint `filenames` one by one, returns the files that did not pass
    pub async fn check_files(&self, filenames: &[String]) -> Result<Vec<String>> {
        println!("Running linter on changed files.");
        let rcfile = format!("--rcfile={}", self.rcfile);
        let mut failed = Vec::new();

        for filename in filenames {
            println!("Checking: {}", filename);
            let out = self
                .executor
                .output(&self.program, &[rcfile.as_str(), filename.as_str()])
                .await?;

            trace!("{} exited with {}", self.program, out.code);
            if !out.success() {
                println!("{}", out.stdout);
                failed.push(filename.clone());
            }
        }

        Ok(failed)
    }
}
