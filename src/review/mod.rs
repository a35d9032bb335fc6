//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


//! The review workflow
//!
//! Every command runs the same pipeline: set up the helpers, check the local and remote git
//! state, prepare and pull a merge, lint, test and finally run the action of the command. Each
//! step either passes or aborts the whole run with a [`ReviewError`].

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use regex::Regex;
use tracing::{debug, error, info, trace, warn};

use crate::commands;
use crate::config::Configuration;
use crate::project::ProjectHelper;
use crate::remote::CodeReviewHelper;
use crate::remote::GitHubHelper;
use crate::remote::GitHubOrigin;
use crate::remote::ReadTheDocsHelper;
use crate::tool::PylintHelper;
use crate::tool::SphinxApiDocHelper;
use crate::util::executor::Executor;
use crate::util::executor::SystemExecutor;
use crate::util::git::GitHelper;
use crate::util::netrc::Netrc;
use crate::util::netrc::NetrcEntry;
use crate::util::netrc::NetrcFile;

mod command;
pub use command::*;

mod error;
pub use error::*;

mod file;
pub use file::*;

mod options;
pub use options::*;

/// Author and commit description of a merge, taken from the code review
#[derive(Clone, Debug, Getters)]
pub struct MergeDetails {
    #[getset(get = "pub")]
    author: String,

    #[getset(get = "pub")]
    description: String,
}

impl MergeDetails {
    pub fn new(author: String, description: String) -> Self {
        MergeDetails {
            author,
            description,
        }
    }
}

/// Remove a leading "[project] " marker from a code review subject
pub fn strip_project_prefix(subject: &str, projects: &[String]) -> String {
    let alternatives = projects
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&format!(r"^\[({})\] ", alternatives)) {
        Ok(re) => re.replace(subject, "").into_owned(),
        Err(e) => {
            warn!("Cannot build project prefix pattern: {}", e);
            subject.to_string()
        }
    }
}

/// The name a merge commit is attributed to
///
/// The GitHub profile name wins, then the code review owner, then the GitHub company.
pub fn merge_full_name(
    github_name: Option<&str>,
    codereview_owner: Option<&str>,
    github_company: Option<&str>,
) -> Option<String> {
    [github_name, codereview_owner, github_company]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

pub struct ReviewHelper {
    pub(crate) options: ReviewOptions,
    pub(crate) config: Configuration,
    pub(crate) netrc: NetrcFile,
    pub(crate) credentials: Option<Netrc>,
    pub(crate) project: ProjectHelper,
    pub(crate) git: GitHelper,
    pub(crate) github: GitHubHelper,
    pub(crate) readthedocs: ReadTheDocsHelper,
    pub(crate) pylint: PylintHelper,
    pub(crate) codereview: Option<CodeReviewHelper>,
    pub(crate) apidoc: Option<SphinxApiDocHelper>,
    pub(crate) executor: Arc<dyn Executor>,
    pub(crate) active_branch: Option<String>,
    pub(crate) merge: Option<MergeDetails>,
}

impl ReviewHelper {
    /// Find the project `cwd` belongs to and set up the helpers the command needs
    pub async fn initialize_helpers(
        options: ReviewOptions,
        config: Configuration,
        netrc: NetrcFile,
        cwd: &Path,
    ) -> Result<Self> {
        let project = match ProjectHelper::detect(cwd, config.supported_projects()) {
            Ok(project) => project,
            Err(e) => {
                debug!("Project detection failed: {:?}", e);
                return Err(abort(options.command(), "unable to determine project name"));
            }
        };
        info!("Project: {} in {}", project.name(), project.root().display());

        let executor = Arc::new(SystemExecutor::new(project.root().clone()));
        let client = crate::remote::http_client()?;
        let helper = Self::with_helpers(options, config, netrc, project, executor, client)?;

        // sphinx-apidoc releases without --version are still usable
        if let Some(apidoc) = helper.apidoc.as_ref() {
            match apidoc.check_up_to_date_version().await {
                Ok(true) => {}
                Ok(false) => warn!(
                    "sphinx-apidoc version {} or later recommended",
                    apidoc.minimum_version()
                ),
                Err(e) => warn!("Cannot determine sphinx-apidoc version: {}", e),
            }
        }

        Ok(helper)
    }

    pub fn with_helpers(
        options: ReviewOptions,
        config: Configuration,
        netrc: NetrcFile,
        project: ProjectHelper,
        executor: Arc<dyn Executor>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let command = options.command();
        let repo_url = config.project_git_url(project.name());
        trace!("Project git URL: {}", repo_url);

        let git = GitHelper::new(project.root().clone(), repo_url, executor.clone());
        let github = GitHubHelper::new(
            config.organization().clone(),
            project.name().clone(),
            config.github_url().clone(),
            config.github_api_url().clone(),
            client.clone(),
        );
        let readthedocs = ReadTheDocsHelper::new(
            project.name().clone(),
            config.readthedocs_url().clone(),
            client.clone(),
        );
        let pylint = PylintHelper::new(
            config.linter().clone(),
            config.linter_rcfile().clone(),
            config.linter_minimum_version().clone(),
            executor.clone(),
        );

        let codereview = if command.uses_codereview() {
            let email_address = git.email_address()?;
            let helper = CodeReviewHelper::new(
                config.codereview_url().clone(),
                config.upload_tool().clone(),
                email_address,
                options.no_browser(),
                config.reviewers_for(project.name()),
                config.cc_reviewers().iter().cloned().collect(),
                client,
                executor.clone(),
            );
            Some(helper)
        } else {
            None
        };

        let apidoc = if command == ReviewCommand::Merge {
            Some(SphinxApiDocHelper::new(
                config.apidoc().clone(),
                project.name().clone(),
                config.apidoc_output_dir().clone(),
                config.apidoc_minimum_version().clone(),
                executor.clone(),
            ))
        } else {
            None
        };

        Ok(ReviewHelper {
            options,
            config,
            netrc,
            credentials: None,
            project,
            git,
            github,
            readthedocs,
            pylint,
            codereview,
            apidoc,
            executor,
            active_branch: None,
            merge: None,
        })
    }

    pub fn command(&self) -> ReviewCommand {
        self.options.command()
    }

    /// An error aborting the current command
    pub fn abort<R: Into<String>>(&self, reason: R) -> anyhow::Error {
        abort(self.command(), reason)
    }

    /// An error aborting the current command, telling the user how to fix the problem
    pub fn abort_with_hint<R, H>(&self, reason: R, hint: H) -> anyhow::Error
    where
        R: Into<String>,
        H: Into<String>,
    {
        ReviewError::aborted(self.command().title(), reason)
            .with_hint(hint)
            .into()
    }

    pub(crate) fn active_branch(&self) -> Result<&str> {
        self.active_branch
            .as_deref()
            .ok_or_else(|| anyhow!("Active branch not determined"))
    }

    pub(crate) fn feature_branch(&self) -> Result<&str> {
        self.options
            .feature_branch()
            .as_deref()
            .ok_or_else(|| anyhow!("No feature branch given"))
    }

    pub(crate) fn issue_number(&self) -> Result<u64> {
        self.options
            .issue_number()
            .ok_or_else(|| anyhow!("No code review issue number given"))
    }

    pub(crate) fn fork(&self) -> Result<&GitHubOrigin> {
        self.options
            .fork()
            .as_ref()
            .ok_or_else(|| anyhow!("No GitHub origin given"))
    }

    pub(crate) fn codereview(&mut self) -> Result<&mut CodeReviewHelper> {
        let command = self.command();
        self.codereview
            .as_mut()
            .ok_or_else(|| anyhow!("No codereview helper for command {}", command))
    }

    pub(crate) fn review_file(&self, branch: &str) -> ReviewFile {
        ReviewFile::new(self.project.root(), branch)
    }

    pub(crate) fn is_documentation_project(&self) -> bool {
        self.config.is_documentation_project(self.project.name())
    }

    /// Read the access tokens from the `.netrc`
    ///
    /// The codereview token comes from the entry of the codereview host or the `default` entry.
    /// Without one the user is asked for it when it is needed.
    pub fn load_credentials(&mut self) -> Result<()> {
        let netrc = self.netrc.load()?;

        let codereview_token = self
            .config
            .codereview_url()
            .host_str()
            .and_then(|host| netrc.machine(host))
            .and_then(NetrcEntry::token)
            .map(String::from);
        if let (Some(codereview), Some(token)) = (self.codereview.as_mut(), codereview_token) {
            codereview.set_access_token(token);
        }

        self.credentials = Some(netrc);
        Ok(())
    }

    pub(crate) fn github_access_token(&self) -> Option<&str> {
        self.credentials
            .as_ref()
            .and_then(Netrc::github_access_token)
    }

    /// Run the whole pipeline of the command
    pub async fn run(&mut self) -> Result<()> {
        let command = self.command();

        if command.uses_credentials() {
            self.load_credentials()?;
        }

        self.check_local_git_state().await?;
        if self.options.offline() {
            debug!("Offline, not checking remote git state");
        } else {
            self.check_remote_git_state().await?;
        }

        if command == ReviewCommand::Merge {
            let issue_number = self.issue_number()?;
            self.prepare_merge(issue_number).await?;
        }
        if command.pulls_from_fork() {
            self.pull_changes_from_fork().await?;
        }

        self.lint().await?;
        self.test().await?;

        match command {
            ReviewCommand::Close => commands::close(self).await,
            ReviewCommand::Create => commands::create(self).await,
            ReviewCommand::Merge => commands::merge(self).await,
            ReviewCommand::Open => commands::open(self).await,
            ReviewCommand::Update => commands::update(self).await,
            ReviewCommand::UpdateAuthors => commands::update_authors(self),
            ReviewCommand::UpdateVersion => commands::update_version(self),
            ReviewCommand::Lint
            | ReviewCommand::LintTest
            | ReviewCommand::MergeEdit
            | ReviewCommand::Test => Ok(()),
        }
    }

    pub async fn check_local_git_state(&mut self) -> Result<()> {
        let command = self.command();

        if command.requires_upstream() && !self.git.check_has_project_upstream()? {
            let hint = format!("Run: git remote add upstream {}", self.git.repo_url());
            return Err(self.abort_with_hint("missing project upstream", hint));
        }

        if command.requires_origin() && !self.git.check_has_project_origin()? {
            return Err(self.abort("missing project origin"));
        }

        if command.requires_clean_worktree() && self.git.check_has_uncommitted_changes()? {
            return Err(self.abort_with_hint("detected uncommitted changes", "Run: git commit"));
        }

        match command {
            ReviewCommand::Create | ReviewCommand::Update => {
                let active = self.git.active_branch()?;
                if active == "master" {
                    return Err(self.abort("active branch is master"));
                }
                self.active_branch = Some(active);
            }

            ReviewCommand::Close => {
                if self.feature_branch()? == "master" {
                    return Err(self.abort("feature branch cannot be master"));
                }

                if self.git.active_branch()? != "master"
                    && !self.git.switch_to_master_branch().await?
                {
                    warn!("Unable to switch to the master branch");
                }
                self.active_branch = Some(String::from("master"));
            }

            _ => {}
        }

        Ok(())
    }

    pub async fn check_remote_git_state(&mut self) -> Result<()> {
        match self.command() {
            ReviewCommand::Close => {
                if !self.git.synchronize_with_upstream().await? {
                    return Err(self.abort("unable to synchronize with upstream/master"));
                }
            }

            ReviewCommand::Create | ReviewCommand::Update => {
                let force = if self.git.check_synchronized_with_upstream().await? {
                    false
                } else {
                    if !self.git.synchronize_with_upstream().await? {
                        return Err(self.abort("unable to synchronize with upstream/master"));
                    }
                    true
                };

                let branch = self.active_branch()?.to_string();
                if !self.git.push_to_origin(&branch, force).await? {
                    return Err(self.abort(format!("unable to push updates to origin/{}", branch)));
                }
            }

            ReviewCommand::Lint | ReviewCommand::LintTest => {
                if !self.git.check_synchronized_with_upstream().await? {
                    info!("Not synchronized with upstream/master");
                }
            }

            ReviewCommand::Merge => {
                if !self.git.synchronize_with_origin().await? {
                    return Err(self.abort("unable to synchronize with origin/master"));
                }
            }

            _ => {}
        }

        Ok(())
    }

    /// Find out whom to attribute the merge of `issue_number` to and what to call it
    pub async fn prepare_merge(&mut self, issue_number: u64) -> Result<()> {
        let queried = self.codereview()?.query_issue(issue_number).await;
        let issue = match queried {
            Ok(issue) => issue,
            Err(e) => {
                error!("{:?}", e);
                return Err(self.abort(format!(
                    "unable to retrieve code review: {} information",
                    issue_number
                )));
            }
        };

        trace!(
            "Code review {} created {:?}, modified {:?}",
            issue.issue(),
            issue.created(),
            issue.modified()
        );
        if *issue.closed() {
            warn!("Code review {} is already closed", issue_number);
        }

        let description = match issue.subject().as_deref().filter(|s| !s.is_empty()) {
            Some(subject) => strip_project_prefix(subject, self.config.supported_projects()),
            None => {
                return Err(self.abort(format!(
                    "unable to determine description of code review: {}",
                    issue_number
                )))
            }
        };

        let email_address = match issue.owner_email().as_deref().filter(|s| !s.is_empty()) {
            Some(email) => email.to_string(),
            None => {
                return Err(self.abort(format!(
                    "unable to determine email address of owner of code review: {}",
                    issue_number
                )))
            }
        };

        let username = self.fork()?.username().clone();
        let user = match self.github.query_user(&username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Err(self.abort(format!(
                    "unable to retrieve github user: {} information",
                    username
                )))
            }
            Err(e) => {
                error!("{:?}", e);
                return Err(self.abort(format!(
                    "unable to retrieve github user: {} information",
                    username
                )));
            }
        };

        debug!("GitHub user {}: {:?}", user.login(), user.name());
        let full_name = merge_full_name(
            user.name().as_deref(),
            issue.owner().as_deref(),
            user.company().as_deref(),
        )
        .ok_or_else(|| self.abort("unable to determine full name"))?;

        let details = MergeDetails::new(format!("{} <{}>", full_name, email_address), description);
        info!("Merging as {}: {}", details.author, details.description);
        self.merge = Some(details);
        Ok(())
    }

    pub async fn pull_changes_from_fork(&mut self) -> Result<()> {
        let fork = self.fork()?.clone();
        let url = self.github.fork_git_repo_url(fork.username());
        debug!("Pulling {} from {}", fork.branch(), url);

        if !self.git.pull_from_fork(&url, fork.branch()).await? {
            return Err(self.abort("unable to pull changes from fork"));
        }
        Ok(())
    }

    pub async fn lint(&mut self) -> Result<()> {
        let command = self.command();
        if self.is_documentation_project() || !command.runs_linter() {
            trace!("Not linting");
            return Ok(());
        }

        if !self.pylint.check_up_to_date_version().await? {
            return Err(self.abort(format!(
                "pylint version {} or later required",
                self.pylint.minimum_version()
            )));
        }

        let files = self
            .git
            .changed_python_files(self.options.lint_diffbase())
            .await?;
        debug!("Linting {} files", files.len());

        let failed = self.pylint.check_files(&files).await?;
        if failed.is_empty() {
            return Ok(());
        }

        println!("Files with linter errors:");
        for file in failed.iter() {
            println!("  {}", file);
        }

        if command == ReviewCommand::Merge {
            self.git.drop_uncommitted_changes().await?;
        }
        Err(self.abort("unable to pass linter"))
    }

    /// Hand over to the test runner of the project
    pub async fn test(&mut self) -> Result<()> {
        let command = self.command();
        if self.is_documentation_project() || !command.runs_tests() {
            trace!("Not testing");
            return Ok(());
        }

        let (program, args) = self
            .config
            .test_command()
            .split_first()
            .ok_or_else(|| anyhow!("No test command configured"))?;
        let args = args.iter().map(String::as_str).collect::<Vec<_>>();

        let passed = match self.executor.status(program, &args).await {
            Ok(code) => {
                debug!("Test runner exited with {}", code);
                code == 0
            }
            Err(e) => {
                error!("Running tests failed: {:?}", e);
                false
            }
        };

        if passed {
            return Ok(());
        }

        if command == ReviewCommand::Merge {
            self.git.drop_uncommitted_changes().await?;
        }
        Err(self.abort("unable to pass tests"))
    }

    /// Description for a code review or update, the last commit summary unless the user enters
    /// one
    pub(crate) fn description(&self, of: &str) -> Result<String> {
        let generated = self.git.last_commit_message()?;
        println!("Automatic generated description of {}:", of);
        println!("{}", generated);
        println!();

        if self.options.no_confirm() {
            return Ok(generated);
        }

        let prompt = format!(
            "Enter a description for {} or hit enter to use the automatic generated one",
            of
        );
        let entered = if atty::is(atty::Stream::Stdin) {
            dialoguer::Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?
        } else {
            println!("{}:", prompt);
            read_description(&mut std::io::stdin().lock())?
        };

        Ok(choose_description(generated, &entered))
    }
}

/// One line of input, without the line ending
fn read_description<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Reading description from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// The entered description, or the generated one if nothing was entered
fn choose_description(generated: String, entered: &str) -> String {
    let entered = entered.trim();
    if entered.is_empty() {
        generated
    } else {
        entered.to_string()
    }
}

fn abort<R: Into<String>>(command: ReviewCommand, reason: R) -> anyhow::Error {
    ReviewError::aborted(command.title(), reason).into()
}
