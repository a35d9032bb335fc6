//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use tracing::debug;

pub const REVIEW_DIR: &str = ".review";

/// Records which codereview issue belongs to a feature branch
///
/// Stored as `.review/<branch>` below the project root, containing the issue number.
#[derive(Debug)]
pub struct ReviewFile {
    path: PathBuf,
}

impl ReviewFile {
    pub fn new(root: &Path, branch: &str) -> Self {
        ReviewFile {
            path: root.join(REVIEW_DIR).join(branch),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn create(&self, issue_number: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| anyhow!("Creating directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, issue_number.to_string())
            .with_context(|| anyhow!("Writing {}", self.path.display()))?;
        debug!("Wrote issue {} to {}", issue_number, self.path.display());
        Ok(())
    }

    pub fn issue_number(&self) -> Result<u64> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| anyhow!("Reading {}", self.path.display()))?;

        content
            .trim()
            .parse::<u64>()
            .with_context(|| anyhow!("No issue number in {}", self.path.display()))
    }

    pub fn remove(&self) -> Result<()> {
        std::fs::remove_file(&self.path)
            .with_context(|| anyhow!("Removing {}", self.path.display()))
    }
}
