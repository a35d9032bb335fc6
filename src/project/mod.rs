//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The project the review tool is run in and its release metadata files

use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use tracing::{debug, trace};

mod authors;
pub use authors::*;

mod version;
pub use version::*;

#[derive(Debug, Getters)]
pub struct ProjectHelper {
    /// Root of the work tree of the project
    #[getset(get = "pub")]
    root: PathBuf,

    #[getset(get = "pub")]
    name: String,
}

impl ProjectHelper {
    pub fn new(root: PathBuf, name: String) -> Self {
        ProjectHelper { root, name }
    }

    /// Find the project `path` belongs to
    ///
    /// The project is named after the root directory of the git work tree. Checkouts in a
    /// differently named directory are recognized by the Python package directory of a supported
    /// project.
    pub fn detect(path: &Path, supported: &[String]) -> Result<Self> {
        let repo = git2::Repository::discover(path)
            .with_context(|| anyhow!("Finding git repository for {}", path.display()))?;
        let root = repo
            .workdir()
            .ok_or_else(|| anyhow!("Repository at {} is bare", repo.path().display()))?
            .to_path_buf();
        trace!("Project root: {}", root.display());

        let dirname = root
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from);

        if let Some(name) = dirname.filter(|n| supported.contains(n)) {
            debug!("Project name from directory: {}", name);
            return Ok(ProjectHelper::new(root, name));
        }

        supported
            .iter()
            .find(|name| root.join(name).join("__init__.py").is_file())
            .map(|name| {
                debug!("Project name from package directory: {}", name);
                ProjectHelper::new(root.clone(), name.clone())
            })
            .ok_or_else(|| anyhow!("{} is not a supported project", root.display()))
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join(&self.name).join("__init__.py")
    }

    pub fn dpkg_changelog_file(&self) -> PathBuf {
        self.root.join("config").join("dpkg").join("changelog")
    }

    pub fn authors_file(&self) -> PathBuf {
        self.root.join("AUTHORS")
    }

    pub fn apidoc_config_file(&self) -> PathBuf {
        self.root.join("docs").join("conf.py")
    }
}
