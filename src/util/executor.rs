//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Running external programs
//!
//! Everything the review workflow delegates to another tool (git, pylint, the upload tool, the
//! test runner, sphinx-apidoc) goes through the `Executor` trait, so the workflow can be driven
//! against a scripted executor in tests.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, trace};

/// The captured result of a program run
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `program` with `args` and capture its output
    ///
    /// Stdin is inherited, so tools that ask for input (the upload tool asking for an access
    /// token) can still do so.
    async fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run `program` with `args` attached to the terminal and return its exit code
    async fn status(&self, program: &str, args: &[&str]) -> Result<i32>;
}

/// Executor that spawns real processes in a working directory
pub struct SystemExecutor {
    workdir: PathBuf,
}

impl SystemExecutor {
    pub fn new(workdir: PathBuf) -> Self {
        SystemExecutor { workdir }
    }

    fn command(&self, program: &str, args: &[&str]) -> Result<tokio::process::Command> {
        let path = which::which(program)
            .with_context(|| anyhow!("Cannot find '{}' in $PATH", program))?;

        trace!("Resolved {} to {}", program, path.display());
        let mut cmd = tokio::process::Command::new(path);
        cmd.args(args).current_dir(&self.workdir);
        Ok(cmd)
    }
}

#[async_trait]
impl Executor for SystemExecutor {
    async fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("Running: {} {}", program, args.join(" "));
        let out = self
            .command(program, args)?
            .stdin(Stdio::inherit())
            .output()
            .await
            .with_context(|| anyhow!("Running '{}'", program))?;

        let output = CommandOutput {
            code: out.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        };
        trace!("{} exited with {}", program, output.code);
        Ok(output)
    }

    async fn status(&self, program: &str, args: &[&str]) -> Result<i32> {
        debug!("Running attached: {} {}", program, args.join(" "));
        let status = self
            .command(program, args)?
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| anyhow!("Running '{}'", program))?;

        Ok(status.code().unwrap_or(-1))
    }
}
