//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Access to the local git repository
//!
//! Read-only queries go through git2, anything that modifies the repository or talks to a remote
//! is delegated to the git command line tool, so the user's credential helpers and hooks apply.

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Error;
use anyhow::Result;
use getset::Getters;
use git2::BranchType;
use git2::ErrorCode;
use git2::Repository;
use git2::Sort;
use git2::StatusOptions;
use tracing::{debug, trace};

use crate::util::executor::CommandOutput;
use crate::util::executor::Executor;

#[derive(Getters)]
pub struct GitHelper {
    #[getset(get = "pub")]
    workdir: PathBuf,

    #[getset(get = "pub")]
    repo_url: String,

    executor: Arc<dyn Executor>,
}

impl GitHelper {
    pub fn new(workdir: PathBuf, repo_url: String, executor: Arc<dyn Executor>) -> Self {
        GitHelper {
            workdir,
            repo_url,
            executor,
        }
    }

    fn repo(&self) -> Result<Repository> {
        Repository::open(&self.workdir)
            .with_context(|| anyhow!("Opening git repository at {}", self.workdir.display()))
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let out = self.executor.output("git", args).await?;
        if !out.success() {
            debug!("git {} failed ({}): {}", args.join(" "), out.code, out.stderr.trim());
        }
        Ok(out)
    }

    async fn git_ok(&self, args: &[&str]) -> Result<bool> {
        self.git(args).await.map(|out| out.success())
    }

    /// Get the URL of a remote, `None` if there is no such remote
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        let repo = self.repo()?;
        let remote = match repo.find_remote(name) {
            Ok(remote) => remote,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) if e.class() == git2::ErrorClass::Config => return Ok(None),
            Err(e) => return Err(Error::from(e)),
        };

        let url = remote.url().map(String::from);
        trace!("Remote {} = {:?}", name, url);
        Ok(url)
    }

    fn remote_is_project(&self, name: &str) -> Result<bool> {
        Ok(self
            .remote_url(name)?
            .map(|url| same_repo_url(&url, &self.repo_url))
            .unwrap_or(false))
    }

    pub fn check_has_project_upstream(&self) -> Result<bool> {
        self.remote_is_project("upstream")
    }

    pub fn check_has_project_origin(&self) -> Result<bool> {
        self.remote_is_project("origin")
    }

    pub fn remote_origin(&self) -> Result<Option<String>> {
        self.remote_url("origin")
    }

    pub fn check_has_uncommitted_changes(&self) -> Result<bool> {
        let repo = self.repo()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let changed = repo
            .statuses(Some(&mut opts))?
            .iter()
            .filter(|entry| !entry.status().is_empty())
            .inspect(|entry| trace!("Changed: {:?} {:?}", entry.path(), entry.status()))
            .count();

        trace!("Repo state: {:?}", repo.state());
        Ok(changed != 0 || repo.state() != git2::RepositoryState::Clean)
    }

    pub fn active_branch(&self) -> Result<String> {
        let repo = self.repo()?;
        let head = repo
            .head()
            .with_context(|| anyhow!("Getting HEAD from repository at {}", repo.path().display()))?;

        if !head.is_branch() {
            return Ok(String::from("HEAD"));
        }

        head.shorthand()
            .map(String::from)
            .ok_or_else(|| anyhow!("Branch name is not valid UTF-8"))
    }

    pub fn has_branch(&self, name: &str) -> Result<bool> {
        let repo = self.repo()?;
        let found = match repo.find_branch(name, BranchType::Local) {
            Ok(_) => true,
            Err(e) if e.code() == ErrorCode::NotFound => false,
            Err(e) => return Err(Error::from(e)),
        };
        Ok(found)
    }

    pub fn email_address(&self) -> Result<Option<String>> {
        let config = self.repo()?.config()?;
        match config.get_string("user.email") {
            Ok(email) => Ok(Some(email)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::from(e)),
        }
    }

    /// Summary line of the commit HEAD points to
    pub fn last_commit_message(&self) -> Result<String> {
        let repo = self.repo()?;
        let commit = repo
            .head()
            .with_context(|| anyhow!("Getting HEAD from repository at {}", repo.path().display()))?
            .peel_to_commit()
            .context("HEAD does not point to a commit")?;

        commit
            .summary()
            .map(String::from)
            .ok_or_else(|| anyhow!("Commit message of {} is not valid UTF-8", commit.id()))
    }

    /// All distinct commit authors as "Name <email>", in order of their first commit
    pub fn authors(&self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        walk.push_head()?;

        let mut seen = BTreeSet::new();
        let mut authors = Vec::new();
        for oid in walk {
            let commit = repo.find_commit(oid?)?;
            let author = commit.author();
            let entry = format!(
                "{} <{}>",
                author.name().unwrap_or_default(),
                author.email().unwrap_or_default()
            );

            if seen.insert(entry.clone()) {
                authors.push(entry);
            }
        }

        Ok(authors)
    }

    pub async fn switch_to_master_branch(&self) -> Result<bool> {
        self.git_ok(&["checkout", "master"]).await
    }

    /// Whether upstream/master has no commits that are not in HEAD
    pub async fn check_synchronized_with_upstream(&self) -> Result<bool> {
        if !self.git_ok(&["fetch", "upstream"]).await? {
            return Ok(false);
        }

        let out = self
            .git(&["log", "HEAD..upstream/master", "--oneline"])
            .await?;
        Ok(out.success() && out.stdout.trim().is_empty())
    }

    pub async fn synchronize_with_upstream(&self) -> Result<bool> {
        if !self.git_ok(&["fetch", "upstream"]).await? {
            return Ok(false);
        }

        self.git_ok(&["pull", "--no-edit", "--rebase", "upstream", "master"])
            .await
    }

    pub async fn synchronize_with_origin(&self) -> Result<bool> {
        if !self.git_ok(&["fetch", "origin"]).await? {
            return Ok(false);
        }

        self.git_ok(&["pull", "--no-edit", "origin", "master"]).await
    }

    pub async fn push_to_origin(&self, branch: &str, force: bool) -> Result<bool> {
        if force {
            self.git_ok(&["push", "-f", "origin", branch]).await
        } else {
            self.git_ok(&["push", "origin", branch]).await
        }
    }

    pub async fn remove_feature_branch(&self, branch: &str) -> Result<bool> {
        if branch == "master" {
            return Err(anyhow!("Refusing to remove the master branch"));
        }

        self.git_ok(&["branch", "-D", branch]).await
    }

    pub async fn drop_uncommitted_changes(&self) -> Result<bool> {
        if !self.git_ok(&["stash"]).await? {
            return Ok(false);
        }

        self.git_ok(&["stash", "drop"]).await
    }

    pub async fn add_path(&self, path: &str) -> Result<bool> {
        self.git_ok(&["add", "-A", path]).await
    }

    /// Commit all changes with `author` as author and push them to origin/master
    pub async fn commit_to_origin_in_name_of(
        &self,
        issue_number: u64,
        author: &str,
        description: &str,
    ) -> Result<bool> {
        let author = format!("--author={}", author);
        let message = format!("Code review: {}: {}", issue_number, description);
        if !self.git_ok(&["commit", "-a", author.as_str(), "-m", message.as_str()]).await? {
            return Ok(false);
        }

        self.git_ok(&["push", "origin", "master"]).await
    }

    pub async fn pull_from_fork(&self, fork_url: &str, branch: &str) -> Result<bool> {
        self.git_ok(&["pull", "--no-edit", "--squash", fork_url, branch])
            .await
    }

    /// Fetch `branch` from origin and create a local branch tracking it
    pub async fn checkout_branch_from_origin(&self, branch: &str) -> Result<bool> {
        if !self.git_ok(&["fetch", "origin", branch]).await? {
            return Ok(false);
        }

        let upstream = format!("origin/{}", branch);
        self.git_ok(&["checkout", "-b", branch, "--track", upstream.as_str()])
            .await
    }

    /// Python files changed relative to `diffbase`, or all tracked Python files without diffbase
    ///
    /// Files that were deleted are not part of the result.
    pub async fn changed_python_files(&self, diffbase: Option<&str>) -> Result<Vec<String>> {
        let out = match diffbase {
            Some(base) => self.git(&["diff", "--name-only", base]).await?,
            None => self.git(&["ls-files"]).await?,
        };

        if !out.success() {
            return Err(anyhow!(
                "Listing changed files failed: {}",
                out.stderr.trim()
            ));
        }

        Ok(python_files(&out.stdout, &self.workdir))
    }
}

fn python_files(listing: &str, workdir: &Path) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|name| name.ends_with(".py"))
        .filter(|name| workdir.join(name).is_file())
        .map(String::from)
        .collect()
}

fn same_repo_url(a: &str, b: &str) -> bool {
    fn normalize(url: &str) -> &str {
        let url = url.trim().trim_end_matches('/');
        url.strip_suffix(".git").unwrap_or(url)
    }

    normalize(a) == normalize(b)
}
